use std::path::Path;

use tether_store::StorePaths;

use crate::cmd_session::repo_root_or_cwd;

pub fn execute(store: &StorePaths, cwd: &Path) -> anyhow::Result<()> {
    let root = repo_root_or_cwd(cwd);
    let queue = store.queue_for(&root);
    let sessions = queue.list()?;

    println!("Repository: {}", root.display());
    println!("Queue: {}", queue.path().display());
    println!("Claude hooks: {}", claude_hooks_state(&root));

    if sessions.is_empty() {
        println!("(no sessions queued)");
        return Ok(());
    }
    for s in &sessions {
        println!(
            "{}  {:<5}  {} {}  commits={}  {}",
            s.id,
            s.status,
            s.agent,
            s.agent_version,
            s.commits.len(),
            s.data_path.display()
        );
    }
    Ok(())
}

fn claude_hooks_state(root: &Path) -> &'static str {
    if tether_bridge_claude::is_installed(root) {
        "installed"
    } else {
        "not installed (run `tether bridge claude install`)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hook_state_follows_install() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(claude_hooks_state(tmp.path()).starts_with("not installed"));
        tether_bridge_claude::install(tmp.path()).unwrap();
        assert_eq!(claude_hooks_state(tmp.path()), "installed");
        tether_bridge_claude::uninstall(tmp.path()).unwrap();
        assert!(claude_hooks_state(tmp.path()).starts_with("not installed"));
    }

    #[test]
    fn status_of_empty_queue_succeeds() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StorePaths::at(tmp.path().join("store"));
        execute(&store, tmp.path()).unwrap();
    }
}
