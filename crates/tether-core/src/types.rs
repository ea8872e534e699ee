use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Agent version recorded until the version probe reports back.
pub const UNKNOWN_VERSION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Open,
    Ended,
}

impl SessionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionStatus::Open => "open",
            SessionStatus::Ended => "ended",
        }
    }
}

impl fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// A commit made while a session was open.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRef {
    pub sha: String,
    pub branch: String,
}

/// One locally queued agent conversation awaiting relay.
///
/// `data_path` references the raw transcript; its content is never copied
/// into the queue document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedSession {
    pub id: String,
    pub agent: String,
    pub agent_version: String,
    pub status: SessionStatus,
    pub data_path: PathBuf,
    #[serde(default)]
    pub commits: Vec<CommitRef>,
}

impl TrackedSession {
    /// New `Open` session with no commits.
    pub fn open(
        id: impl Into<String>,
        agent: impl Into<String>,
        agent_version: impl Into<String>,
        data_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            id: id.into(),
            agent: agent.into(),
            agent_version: agent_version.into(),
            status: SessionStatus::Open,
            data_path: data_path.into(),
            commits: Vec::new(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == SessionStatus::Open
    }

    /// Append a commit unless this session already holds its sha.
    /// Returns true when the commit was added.
    pub fn push_commit(&mut self, commit: CommitRef) -> bool {
        if self.commits.iter().any(|c| c.sha == commit.sha) {
            return false;
        }
        self.commits.push(commit);
        true
    }
}

/// Partial update merged into an existing session by `QueueStore::update`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionPatch {
    pub agent_version: Option<String>,
    pub status: Option<SessionStatus>,
}

impl SessionPatch {
    pub fn status(status: SessionStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn agent_version(version: impl Into<String>) -> Self {
        Self {
            agent_version: Some(version.into()),
            ..Self::default()
        }
    }

    pub fn apply(&self, session: &mut TrackedSession) {
        if let Some(version) = &self.agent_version {
            session.agent_version = version.clone();
        }
        if let Some(status) = self.status {
            session.status = status;
        }
    }
}

/// Commit metadata sent to the remote service (no file contents).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitMeta {
    pub sha: String,
    pub branch: String,
    pub message: String,
    pub author_name: String,
    pub author_email: String,
    /// Committer date, ISO 8601 as reported by git.
    pub timestamp: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Fields derived from a transcript by an agent-specific extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrichment {
    pub first_message: Option<String>,
    pub session_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_serializes_camel_case() {
        let mut s = TrackedSession::open("a", "claude", UNKNOWN_VERSION, "/t/x.log");
        s.push_commit(CommitRef {
            sha: "abc".into(),
            branch: "main".into(),
        });
        let json = serde_json::to_value(&s).unwrap();
        assert_eq!(json["id"], "a");
        assert_eq!(json["agentVersion"], "unknown");
        assert_eq!(json["status"], "open");
        assert_eq!(json["dataPath"], "/t/x.log");
        assert_eq!(json["commits"][0]["sha"], "abc");
    }

    #[test]
    fn missing_commits_default_to_empty() {
        let json = r#"{"id":"b","agent":"codex","agentVersion":"1.0","status":"ended","dataPath":"/t/y"}"#;
        let s: TrackedSession = serde_json::from_str(json).unwrap();
        assert_eq!(s.status, SessionStatus::Ended);
        assert!(s.commits.is_empty());
    }

    #[test]
    fn push_commit_keeps_sha_unique() {
        let mut s = TrackedSession::open("a", "claude", "1.0", "/t/x");
        let c = CommitRef {
            sha: "deadbeef".into(),
            branch: "main".into(),
        };
        assert!(s.push_commit(c.clone()));
        assert!(!s.push_commit(c));
        assert_eq!(s.commits.len(), 1);
    }

    #[test]
    fn patch_merges_only_set_fields() {
        let mut s = TrackedSession::open("a", "claude", UNKNOWN_VERSION, "/t/x");
        SessionPatch::agent_version("2.1.0").apply(&mut s);
        assert_eq!(s.agent_version, "2.1.0");
        assert_eq!(s.status, SessionStatus::Open);
        SessionPatch::status(SessionStatus::Ended).apply(&mut s);
        assert_eq!(s.status, SessionStatus::Ended);
        assert_eq!(s.agent, "claude");
    }
}
