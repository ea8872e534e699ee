use std::io::Read;

use tether_core::{Result, TetherError};

use crate::config::RemoteConfig;
use crate::wire::{CommitRequest, UploadTargets, UploadUrlRequest};

/// The three calls of the upload protocol.
///
/// Implementations must not retry: each sync pass is a single best-effort
/// sweep and a failed session simply stays queued.
pub trait RemoteApi {
    /// Phase A: ask for one-time upload locations for a session.
    fn request_upload_targets(&self, session_id: &str) -> Result<UploadTargets>;

    /// Phase B (and search text): stream `len` bytes of `body` to a one-time
    /// location. No credential is attached; the location is pre-authorized.
    fn upload(&self, url: &str, body: &mut dyn Read, len: u64, content_type: &str) -> Result<()>;

    /// Phase C: submit session metadata and commit metadata.
    fn commit_session(&self, request: &CommitRequest) -> Result<()>;
}

/// `RemoteApi` over HTTPS with bearer-token auth.
pub struct HttpRemote {
    config: RemoteConfig,
    agent: ureq::Agent,
}

impl HttpRemote {
    pub fn new(config: RemoteConfig) -> Self {
        let agent = ureq::Agent::config_builder().build().new_agent();
        Self { config, agent }
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.api_token)
    }

    fn post_json(&self, path: &str, body: String, context: &str) -> Result<String> {
        let url = self.config.endpoint(path);
        let mut resp = self
            .agent
            .post(&url)
            .header("Authorization", self.bearer())
            .header("Content-Type", "application/json")
            .send(body)
            .map_err(|e| TetherError::network(context, e))?;
        resp.body_mut()
            .read_to_string()
            .map_err(|e| TetherError::network(context, e))
    }
}

impl RemoteApi for HttpRemote {
    fn request_upload_targets(&self, session_id: &str) -> Result<UploadTargets> {
        let body = serde_json::to_string(&UploadUrlRequest { session_id })?;
        let text = self.post_json("/sessions/upload-url", body, "request upload urls")?;
        serde_json::from_str(&text)
            .map_err(|e| TetherError::network("request upload urls", format!("bad response: {e}")))
    }

    fn upload(&self, url: &str, body: &mut dyn Read, len: u64, content_type: &str) -> Result<()> {
        // Object stores reject chunked PUTs, so the length is sent up front.
        self.agent
            .put(url)
            .header("Content-Type", content_type)
            .header("Content-Length", len.to_string())
            .send(ureq::SendBody::from_reader(body))
            .map_err(|e| TetherError::network(format!("upload {content_type}"), e))?;
        tracing::debug!(bytes = len, content_type, "uploaded object");
        Ok(())
    }

    fn commit_session(&self, request: &CommitRequest) -> Result<()> {
        let body = serde_json::to_string(request)?;
        self.post_json("/sessions", body, "commit session")?;
        Ok(())
    }
}
