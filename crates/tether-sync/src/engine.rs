//! One sync pass over a repository's session queue.
//!
//! Order of a pass:
//! 1. load the queue (empty ⇒ done)
//! 2. reap stale open sessions
//! 3. resolve the owning repository identity (failure aborts the pass)
//! 4. relay every session that has commits, one at a time
//! 5. reconcile outcomes with the on-disk queue and write it back once
//!
//! Per-session failures are logged and leave that session queued; only the
//! identity step and queue I/O fail the pass.

use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;
use std::time::{Duration, SystemTime};

use tether_core::{CommitMeta, Enrichment, Result, SessionStatus, TetherError, TrackedSession};
use tether_git::{GitCollaborator, RepoIdentity};
use tether_remote::{CommitRequest, RemoteApi, SEARCH_CONTENT_TYPE, TRANSCRIPT_CONTENT_TYPE};
use tether_store::QueueStore;
use tether_transcript::{build_search_text, ExtractorRegistry};

use crate::reap::reap_stale;
use crate::reconcile::{reconcile, Outcome};

/// Open sessions whose transcript has been quiet this long are ended.
pub const DEFAULT_STALE_AFTER: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub stale_after: Duration,
    /// Explicit `org/name`; when unset the git remote decides.
    pub repo_override: Option<String>,
    pub clock: fn() -> SystemTime,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            stale_after: DEFAULT_STALE_AFTER,
            repo_override: None,
            clock: SystemTime::now,
        }
    }
}

impl SyncOptions {
    /// Defaults, with `TETHER_STALE_SECS` overriding the staleness window.
    pub fn from_env() -> Self {
        Self {
            stale_after: stale_after_from(std::env::var("TETHER_STALE_SECS").ok().as_deref()),
            ..Self::default()
        }
    }
}

/// Whole seconds; anything unparsable keeps the default.
fn stale_after_from(value: Option<&str>) -> Duration {
    value
        .and_then(|v| v.trim().parse().ok())
        .map(Duration::from_secs)
        .unwrap_or(DEFAULT_STALE_AFTER)
}

/// Counters for one pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub queued: usize,
    pub reaped: usize,
    pub skipped: usize,
    pub relayed: usize,
    pub removed: usize,
    pub pruned: usize,
    pub failed: usize,
    pub remaining: usize,
}

enum Relay {
    Delivered,
    /// Transcript is gone; the session can never be relayed.
    Pruned,
}

pub struct SyncEngine<'a> {
    queue: &'a QueueStore,
    remote: &'a dyn RemoteApi,
    git: &'a dyn GitCollaborator,
    extractors: &'a ExtractorRegistry,
    options: SyncOptions,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        queue: &'a QueueStore,
        remote: &'a dyn RemoteApi,
        git: &'a dyn GitCollaborator,
        extractors: &'a ExtractorRegistry,
        options: SyncOptions,
    ) -> Self {
        Self {
            queue,
            remote,
            git,
            extractors,
            options,
        }
    }

    pub fn run(&self) -> Result<SyncReport> {
        let snapshot = self.queue.list()?;
        let mut report = SyncReport {
            queued: snapshot.len(),
            ..SyncReport::default()
        };
        if snapshot.is_empty() {
            return Ok(report);
        }

        let mut working = snapshot.clone();
        report.reaped = reap_stale(&mut working, (self.options.clock)(), self.options.stale_after);

        let identity = self.resolve_identity()?;
        let repo = identity.to_string();

        let mut outcomes = HashMap::with_capacity(working.len());
        for session in working {
            let outcome = if session.commits.is_empty() {
                report.skipped += 1;
                Outcome::Keep(session.clone())
            } else {
                match self.relay(&session, &repo) {
                    Ok(Relay::Delivered) => {
                        report.relayed += 1;
                        tracing::info!(session_id = %session.id, status = %session.status, commits = session.commits.len(), "session relayed");
                        if session.status == SessionStatus::Ended {
                            report.removed += 1;
                            Outcome::Drop
                        } else {
                            Outcome::Keep(session.clone())
                        }
                    }
                    Ok(Relay::Pruned) => {
                        report.pruned += 1;
                        Outcome::Drop
                    }
                    Err(e) => {
                        report.failed += 1;
                        tracing::warn!(session_id = %session.id, kind = ?e.kind(), error = %e, "relay failed; session stays queued");
                        Outcome::Keep(session.clone())
                    }
                }
            };
            outcomes.insert(session.id, outcome);
        }

        report.remaining = self.queue.mutate(|current| {
            *current = reconcile(std::mem::take(current), &snapshot, outcomes);
            Ok(current.len())
        })?;
        Ok(report)
    }

    fn resolve_identity(&self) -> Result<RepoIdentity> {
        match &self.options.repo_override {
            Some(explicit) => explicit.parse(),
            None => self.git.repo_identity(),
        }
    }

    /// Relay one session through the three-phase upload protocol.
    fn relay(&self, session: &TrackedSession, repo: &str) -> Result<Relay> {
        let (mut file, len) = match open_transcript(&session.data_path) {
            Ok(opened) => opened,
            Err(TetherError::MissingFile(path)) => {
                tracing::warn!(session_id = %session.id, path = %path.display(), "transcript missing; dropping session");
                return Ok(Relay::Pruned);
            }
            Err(e) => return Err(e),
        };
        let commits = self.commit_metadata(session);

        let targets = self.remote.request_upload_targets(&session.id)?;
        self.remote
            .upload(&targets.url, &mut file, len, TRANSCRIPT_CONTENT_TYPE)?;

        let (enrichment, search) = match self.extractors.get(&session.agent) {
            Some(extractor) => match reread_text(&mut file) {
                Ok(text) => {
                    let enrichment = extractor.enrichment(&text);
                    let files = changed_paths(&commits);
                    let search = build_search_text(&extractor.excerpts(&text), &files, &enrichment);
                    (enrichment, search)
                }
                Err(e) => {
                    tracing::warn!(session_id = %session.id, error = %e, "transcript unreadable after upload; relaying without enrichment");
                    (Enrichment::default(), None)
                }
            },
            None => (Enrichment::default(), None),
        };

        let search_uploaded = match search {
            Some(search) => match self.remote.upload(
                &targets.search_url,
                &mut search.as_bytes(),
                search.len() as u64,
                SEARCH_CONTENT_TYPE,
            ) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(session_id = %session.id, error = %e, "search text upload failed");
                    false
                }
            },
            None => false,
        };

        let request = CommitRequest::new(session, repo, &targets, search_uploaded, enrichment, commits);
        self.remote.commit_session(&request)?;
        Ok(Relay::Delivered)
    }

    /// Per-commit metadata. A commit whose core metadata cannot be read is
    /// skipped; an unreadable file list becomes empty.
    fn commit_metadata(&self, session: &TrackedSession) -> Vec<CommitMeta> {
        session
            .commits
            .iter()
            .filter_map(|commit| {
                let mut meta = match self.git.commit_meta(commit) {
                    Ok(meta) => meta,
                    Err(e) => {
                        tracing::warn!(session_id = %session.id, sha = %commit.sha, error = %e, "skipping commit without metadata");
                        return None;
                    }
                };
                meta.files = self.git.changed_files(&commit.sha).unwrap_or_else(|e| {
                    tracing::debug!(sha = %commit.sha, error = %e, "changed files unavailable");
                    Vec::new()
                });
                Some(meta)
            })
            .collect()
    }
}

/// Open a transcript for streaming; returns the handle and its byte length.
fn open_transcript(path: &Path) -> Result<(File, u64)> {
    let file = File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            TetherError::MissingFile(path.to_path_buf())
        } else {
            TetherError::io(format!("open transcript {}", path.display()), e)
        }
    })?;
    let meta = file
        .metadata()
        .map_err(|e| TetherError::io(format!("stat transcript {}", path.display()), e))?;
    if !meta.is_file() {
        let e = std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file");
        return Err(TetherError::io(format!("open transcript {}", path.display()), e));
    }
    Ok((file, meta.len()))
}

/// Read an already uploaded transcript back as text for extraction.
fn reread_text(file: &mut File) -> std::io::Result<String> {
    file.rewind()?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw)?;
    Ok(String::from_utf8(raw).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned()))
}

/// Changed paths across all commits, first occurrence order, no duplicates.
fn changed_paths(commits: &[CommitMeta]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    commits
        .iter()
        .flat_map(|c| c.files.iter())
        .filter(|f| seen.insert(f.as_str()))
        .cloned()
        .collect()
}
