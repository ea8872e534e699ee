use serde::{Deserialize, Serialize};
use tether_core::{CommitMeta, Enrichment, SessionStatus, TrackedSession};

#[derive(Debug, Serialize)]
pub(crate) struct UploadUrlRequest<'a> {
    pub session_id: &'a str,
}

/// Two one-time upload locations, valid for one hour.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadTargets {
    pub url: String,
    pub key: String,
    pub search_url: String,
    pub search_key: String,
}

/// Session metadata for the commit phase. Never carries transcript content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionBody {
    pub id: String,
    pub agent: String,
    pub agent_version: String,
    pub status: SessionStatus,
    pub repo: String,
    pub transcript_key: String,
    pub search_key: Option<String>,
    pub first_message: Option<String>,
    pub session_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitRequest {
    pub session: SessionBody,
    pub commits: Vec<CommitMeta>,
}

impl CommitRequest {
    pub fn new(
        session: &TrackedSession,
        repo: &str,
        targets: &UploadTargets,
        search_uploaded: bool,
        enrichment: Enrichment,
        commits: Vec<CommitMeta>,
    ) -> Self {
        Self {
            session: SessionBody {
                id: session.id.clone(),
                agent: session.agent.clone(),
                agent_version: session.agent_version.clone(),
                status: session.status,
                repo: repo.to_string(),
                transcript_key: targets.key.clone(),
                search_key: search_uploaded.then(|| targets.search_key.clone()),
                first_message: enrichment.first_message,
                session_name: enrichment.session_name,
            },
            commits,
        }
    }
}
