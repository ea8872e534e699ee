//! File-backed session queue, one document per repository.
//!
//! Every read-modify-write runs under an exclusive lock on `queue.lock`, so
//! concurrent hook processes serialize instead of losing each other's updates.
//! Writes go through `write_atomic`, so readers never observe a torn document.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tether_core::{CommitRef, Result, SessionPatch, TetherError, TrackedSession};

const QUEUE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct QueueDocument {
    version: u32,
    #[serde(default)]
    sessions: Vec<TrackedSession>,
}

#[derive(Debug, Clone)]
pub struct QueueStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl QueueStore {
    /// Queue rooted at a project directory. Nothing is touched on disk until
    /// the first write.
    pub fn open(project_dir: impl AsRef<Path>) -> Self {
        let dir = project_dir.as_ref();
        Self {
            path: dir.join("queue.json"),
            lock_path: dir.join("queue.lock"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All sessions in insertion order; empty if the queue was never written.
    pub fn list(&self) -> Result<Vec<TrackedSession>> {
        self.read_unlocked()
    }

    pub fn get(&self, id: &str) -> Result<Option<TrackedSession>> {
        Ok(self.list()?.into_iter().find(|s| s.id == id))
    }

    /// Append a new session. Fails with `DuplicateId` if the id is taken.
    pub fn add(&self, session: TrackedSession) -> Result<()> {
        self.mutate(|sessions| {
            if sessions.iter().any(|s| s.id == session.id) {
                return Err(TetherError::DuplicateId(session.id.clone()));
            }
            sessions.push(session);
            Ok(())
        })
    }

    /// Merge `patch` into the session with `id`. Returns the updated record.
    pub fn update(&self, id: &str, patch: &SessionPatch) -> Result<TrackedSession> {
        self.mutate(|sessions| {
            let session = sessions
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| TetherError::NotFound(id.to_string()))?;
            patch.apply(session);
            Ok(session.clone())
        })
    }

    /// Overwrite the whole document.
    pub fn replace(&self, sessions: &[TrackedSession]) -> Result<()> {
        let _lock = self.lock()?;
        self.write_unlocked(sessions)
    }

    /// Locked read-modify-write. The document is rewritten only when `f`
    /// returns `Ok`.
    pub fn mutate<T>(
        &self,
        f: impl FnOnce(&mut Vec<TrackedSession>) -> Result<T>,
    ) -> Result<T> {
        let _lock = self.lock()?;
        let mut sessions = self.read_unlocked()?;
        let out = f(&mut sessions)?;
        self.write_unlocked(&sessions)?;
        Ok(out)
    }

    /// Append `commit` to every open session that does not already hold its
    /// sha. Returns the ids of the sessions that changed.
    pub fn link_commit(&self, commit: &CommitRef) -> Result<Vec<String>> {
        self.mutate(|sessions| {
            let linked = sessions
                .iter_mut()
                .filter(|s| s.is_open())
                .filter_map(|s| s.push_commit(commit.clone()).then(|| s.id.clone()))
                .collect();
            Ok(linked)
        })
    }

    fn lock(&self) -> Result<crate::LockGuard> {
        crate::lock_file(&self.lock_path)
            .map_err(|e| TetherError::io(format!("lock {}", self.lock_path.display()), e))
    }

    fn read_unlocked(&self) -> Result<Vec<TrackedSession>> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(TetherError::io(
                    format!("read {}", self.path.display()),
                    e,
                ))
            }
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        let doc: QueueDocument = serde_json::from_str(&content).map_err(|e| {
            TetherError::Parse(format!("queue {}: {e}", self.path.display()))
        })?;
        Ok(doc.sessions)
    }

    fn write_unlocked(&self, sessions: &[TrackedSession]) -> Result<()> {
        let doc = QueueDocument {
            version: QUEUE_VERSION,
            sessions: sessions.to_vec(),
        };
        let data = serde_json::to_string_pretty(&doc)?;
        crate::write_atomic(&self.path, data.as_bytes())
            .map_err(|e| TetherError::io(format!("write {}", self.path.display()), e))?;
        tracing::debug!(path = %self.path.display(), count = sessions.len(), "queue written");
        Ok(())
    }
}
