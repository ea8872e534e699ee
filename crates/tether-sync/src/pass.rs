use std::path::Path;

use tether_core::Result;
use tether_git::GitRepo;
use tether_remote::{HttpRemote, RemoteConfig};
use tether_store::{StorePaths, UserConfig};
use tether_transcript::ExtractorRegistry;

use crate::engine::{SyncEngine, SyncOptions, SyncReport};

/// Run one sync pass for the repository containing `cwd`, wired to the real
/// git, HTTP and transcript collaborators.
///
/// Missing remote configuration fails before the queue is touched. The
/// `repo` config key is used when `options` carries no explicit identity.
pub fn sync_repository(store: &StorePaths, cwd: &Path, mut options: SyncOptions) -> Result<SyncReport> {
    let user = UserConfig::load(&store.config_json())?;
    let remote = HttpRemote::new(RemoteConfig::resolve(&user)?);

    let repo = GitRepo::discover(cwd)?;
    let queue = store.queue_for(repo.root());

    if options.repo_override.is_none() {
        options.repo_override = fallback_repo(std::env::var("TETHER_REPO").ok(), &user);
    }

    let extractors = ExtractorRegistry::builtin();
    tracing::debug!(queue = %queue.path().display(), "sync pass starting");
    let report = SyncEngine::new(&queue, &remote, &repo, &extractors, options).run()?;
    tracing::info!(
        relayed = report.relayed,
        removed = report.removed,
        failed = report.failed,
        remaining = report.remaining,
        "sync pass finished"
    );
    Ok(report)
}

/// `TETHER_REPO` when set and non-blank, else the `repo` config key.
fn fallback_repo(env: Option<String>, user: &UserConfig) -> Option<String> {
    env.filter(|v| !v.trim().is_empty())
        .or_else(|| user.get_str("repo"))
}
