use std::path::Path;

use tether_store::StorePaths;
use tether_sync::{sync_repository, SyncOptions, SyncReport};

/// `tether sync [--repo org/name]`
///
/// Fails only when the pass cannot start (remote config, repository, identity,
/// queue I/O). Per-session relay failures are logged and reported in the
/// summary line.
pub fn execute(store: &StorePaths, cwd: &Path, repo: Option<String>) -> anyhow::Result<()> {
    let mut options = SyncOptions::from_env();
    if repo.is_some() {
        options.repo_override = repo;
    }
    let report = sync_repository(store, cwd, options)?;
    eprintln!("{}", summary(&report));
    Ok(())
}

fn summary(report: &SyncReport) -> String {
    if report.queued == 0 {
        return "Nothing queued.".to_string();
    }
    let mut line = format!(
        "Relayed {} of {} session(s): {} removed, {} kept",
        report.relayed,
        report.queued,
        report.removed,
        report.remaining
    );
    if report.failed > 0 {
        line.push_str(&format!(", {} failed", report.failed));
    }
    if report.pruned > 0 {
        line.push_str(&format!(", {} pruned (transcript missing)", report.pruned));
    }
    if report.reaped > 0 {
        line.push_str(&format!(", {} marked ended", report.reaped));
    }
    line
}
