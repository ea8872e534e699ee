use std::path::PathBuf;

use tether_core::Result;
use tether_store::{project_id, StorePaths};

use crate::lifecycle::{LifecycleAdapter, StartEvent, StartOutcome, StartReason};
use crate::parse::*;

/// Agent name recorded on sessions started from Claude Code hooks.
const AGENT: &str = "claude";

/// `SessionStart.source` for a brand-new interactive session. `resume`,
/// `clear` and `compact` starts are not tracked.
const NEW_SESSION_SOURCE: &str = "startup";

/// A freshly queued session whose agent version still has to be probed.
/// The caller decides how to run the probe (usually a detached child process
/// so the hook returns immediately).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeRequest {
    pub session_id: String,
    pub repo_root: PathBuf,
}

/// Result from a hook dispatch.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HookResult {
    pub probe: Option<ProbeRequest>,
}

impl HookResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Main hook entrypoint: parse stdin, dispatch by `hook_event_name`.
///
/// Malformed JSON is a `Parse` error; the caller drops the event. Events
/// other than `SessionStart` and `SessionEnd` are ignored.
pub fn hook_entrypoint_from_stdin(stdin: &str, store: &StorePaths) -> Result<HookResult> {
    if stdin.trim().is_empty() {
        return Ok(HookResult::empty());
    }
    let raw = parse_hook_stdin(stdin)?;

    let hook_event_name = get_str(&raw, "hook_event_name");
    let session_id = get_str(&raw, "session_id");
    let cwd = get_str(&raw, "cwd");

    if session_id.is_empty() {
        tracing::debug!(event = %hook_event_name, "hook payload without session id");
        return Ok(HookResult::empty());
    }

    let open_adapter = || {
        let repo_root = resolve_repo_root(&cwd);
        let pid = project_id(&repo_root);
        let adapter = LifecycleAdapter::new(AGENT, store.queue_for(&repo_root), store.state_dir(&pid));
        (repo_root, adapter)
    };

    match hook_event_name.as_str() {
        "SessionStart" => {
            let (repo_root, adapter) = open_adapter();
            let reason = if get_str(&raw, "source") == NEW_SESSION_SOURCE {
                StartReason::NewInteractive
            } else {
                StartReason::Other
            };
            let transcript = get_str(&raw, "transcript_path");
            let event = StartEvent {
                external_id: session_id,
                transcript_path: (!transcript.is_empty())
                    .then(|| absolute_transcript(&transcript, &hook_dir(&cwd))),
                reason,
            };
            let probe = match adapter.on_start(&event)? {
                StartOutcome::Created(id) => Some(ProbeRequest {
                    session_id: id,
                    repo_root,
                }),
                _ => None,
            };
            Ok(HookResult { probe })
        }
        "SessionEnd" => {
            let (_, adapter) = open_adapter();
            adapter.on_end(&session_id)?;
            Ok(HookResult::empty())
        }
        _ => Ok(HookResult::empty()),
    }
}
