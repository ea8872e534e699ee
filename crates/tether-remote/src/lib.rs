mod client;
mod config;
mod wire;

pub use client::{HttpRemote, RemoteApi};
pub use config::RemoteConfig;
pub use wire::{CommitRequest, SessionBody, UploadTargets};

/// Content type for raw transcript uploads.
pub const TRANSCRIPT_CONTENT_TYPE: &str = "application/json";
/// Content type for derived search text uploads.
pub const SEARCH_CONTENT_TYPE: &str = "text/plain";
