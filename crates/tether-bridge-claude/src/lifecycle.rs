//! Agent-agnostic lifecycle adapter: start/end notifications → queue mutations.
//!
//! Session ids are derived from the transcript path, so a transcript that is
//! resumed after its session ended reopens the same tracked session instead of
//! queueing a duplicate.

use std::path::PathBuf;

use tether_core::hash::session_id_for_path;
use tether_core::{Result, SessionPatch, SessionStatus, TetherError, TrackedSession, UNKNOWN_VERSION};
use tether_store::{read_correlation, remove_correlation, write_correlation, QueueStore};

/// Why the external tool started a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartReason {
    /// A fresh interactive session; the only reason that is tracked.
    NewInteractive,
    /// Resume, compaction, clear, or anything else.
    Other,
}

#[derive(Debug, Clone)]
pub struct StartEvent {
    /// The external tool's own session id.
    pub external_id: String,
    pub transcript_path: Option<PathBuf>,
    pub reason: StartReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartOutcome {
    Ignored,
    /// New session queued; its agent version still needs probing.
    Created(String),
    Reopened(String),
    AlreadyOpen(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndOutcome {
    /// No correlation record: the session was never tracked.
    Untracked,
    Ended(String),
    /// Correlated session no longer in the queue (already relayed and removed).
    Gone(String),
}

pub struct LifecycleAdapter {
    agent: String,
    queue: QueueStore,
    state_dir: PathBuf,
}

impl LifecycleAdapter {
    pub fn new(agent: impl Into<String>, queue: QueueStore, state_dir: impl Into<PathBuf>) -> Self {
        Self {
            agent: agent.into(),
            queue,
            state_dir: state_dir.into(),
        }
    }

    pub fn on_start(&self, event: &StartEvent) -> Result<StartOutcome> {
        let path = match (&event.reason, &event.transcript_path) {
            (StartReason::NewInteractive, Some(p)) if !p.as_os_str().is_empty() => p,
            _ => return Ok(StartOutcome::Ignored),
        };
        let id = session_id_for_path(path);

        // Lookup and insert share one lock so racing hooks cannot both add.
        let outcome = self.queue.mutate(|sessions| {
            Ok(match sessions.iter_mut().find(|s| s.id == id) {
                Some(existing) if existing.status == SessionStatus::Ended => {
                    SessionPatch::status(SessionStatus::Open).apply(existing);
                    StartOutcome::Reopened(id.clone())
                }
                Some(_) => StartOutcome::AlreadyOpen(id.clone()),
                None => {
                    sessions.push(TrackedSession::open(&id, &self.agent, UNKNOWN_VERSION, path));
                    StartOutcome::Created(id.clone())
                }
            })
        })?;

        write_correlation(&self.state_dir, &event.external_id, &id)?;
        tracing::info!(session_id = %id, external_id = %event.external_id, outcome = ?outcome, "session start");
        Ok(outcome)
    }

    pub fn on_end(&self, external_id: &str) -> Result<EndOutcome> {
        let Some(id) = read_correlation(&self.state_dir, external_id)? else {
            tracing::debug!(external_id, "end for untracked session");
            return Ok(EndOutcome::Untracked);
        };

        let outcome = match self.queue.update(&id, &SessionPatch::status(SessionStatus::Ended)) {
            Ok(_) => EndOutcome::Ended(id),
            Err(TetherError::NotFound(_)) => EndOutcome::Gone(id),
            Err(e) => return Err(e),
        };
        remove_correlation(&self.state_dir, external_id)?;
        tracing::info!(external_id, outcome = ?outcome, "session end");
        Ok(outcome)
    }
}
