use std::path::Path;

use crate::cmd_session::repo_root_or_cwd;

/// `tether bridge claude install`
pub fn install_claude(cwd: &Path) -> anyhow::Result<()> {
    let path = tether_bridge_claude::install(&repo_root_or_cwd(cwd))?;
    println!("Installed tether hooks into {}", path.display());
    Ok(())
}

/// `tether bridge claude uninstall`
pub fn uninstall_claude(cwd: &Path) -> anyhow::Result<()> {
    let root = repo_root_or_cwd(cwd);
    if tether_bridge_claude::uninstall(&root)? {
        println!("Uninstalled tether hooks from {}", root.join(".claude").display());
    } else {
        println!("No Claude settings file found under {}", root.display());
    }
    Ok(())
}

/// `tether bridge git install`
pub fn install_git(cwd: &Path) -> anyhow::Result<()> {
    let root = tether_git::repo_root(cwd)?;
    let hook = tether_git::install_post_commit_hook(&root)?;
    println!("Installed post-commit hook at {}", hook.display());
    Ok(())
}

/// `tether bridge git uninstall`
pub fn uninstall_git(cwd: &Path) -> anyhow::Result<()> {
    let root = tether_git::repo_root(cwd)?;
    if tether_git::uninstall_post_commit_hook(&root)? {
        println!("Removed tether from the post-commit hook");
    } else {
        println!("No tether post-commit hook installed");
    }
    Ok(())
}
