mod engine;
mod pass;
mod reap;
mod reconcile;

pub use engine::{SyncEngine, SyncOptions, SyncReport, DEFAULT_STALE_AFTER};
pub use pass::sync_repository;
pub use reap::reap_stale;
