use std::path::Path;

use tether_git::GitRepo;
use tether_store::StorePaths;

/// `tether link`: record HEAD on every open session of this repository.
/// Runs from the post-commit hook, so it never fails the commit.
pub fn execute(store: &StorePaths, cwd: &Path) -> anyhow::Result<()> {
    if let Err(e) = link_head(store, cwd) {
        tracing::warn!(error = %e, "could not link commit to open sessions");
    }
    Ok(())
}

fn link_head(store: &StorePaths, cwd: &Path) -> tether_core::Result<Vec<String>> {
    let repo = GitRepo::discover(cwd)?;
    let commit = repo.head_commit()?;
    let linked = store.queue_for(repo.root()).link_commit(&commit)?;
    tracing::info!(sha = %commit.sha, branch = %commit.branch, sessions = linked.len(), "linked commit");
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command;
    use tether_core::TrackedSession;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .env("GIT_AUTHOR_NAME", "Test")
            .env("GIT_AUTHOR_EMAIL", "test@test.com")
            .env("GIT_COMMITTER_NAME", "Test")
            .env("GIT_COMMITTER_EMAIL", "test@test.com")
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[test]
    fn head_is_linked_to_open_sessions_once() {
        let tmp = tempfile::tempdir().unwrap();
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        if !git(&work, &["init", "-q", "-b", "main"]) {
            return;
        }
        std::fs::write(work.join("a.txt"), "a").unwrap();
        assert!(git(&work, &["add", "."]));
        assert!(git(&work, &["commit", "-q", "-m", "first"]));

        let store = StorePaths::at(tmp.path().join("store"));
        let repo = GitRepo::discover(&work).unwrap();
        let queue = store.queue_for(repo.root());
        let mut ended = TrackedSession::open("b", "claude", "1", "/t/b");
        ended.status = tether_core::SessionStatus::Ended;
        queue
            .replace(&[TrackedSession::open("a", "claude", "1", "/t/a"), ended])
            .unwrap();

        assert_eq!(link_head(&store, &work).unwrap(), ["a"]);
        assert!(link_head(&store, &work).unwrap().is_empty());

        let sessions = queue.list().unwrap();
        assert_eq!(sessions[0].commits.len(), 1);
        assert_eq!(sessions[0].commits[0].branch, "main");
        assert!(sessions[1].commits.is_empty());
    }

    #[test]
    fn outside_git_never_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StorePaths::at(tmp.path().join("store"));
        execute(&store, tmp.path()).unwrap();
    }
}
