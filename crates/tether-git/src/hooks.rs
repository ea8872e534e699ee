use std::fs;
use std::path::{Path, PathBuf};

use tether_core::{Result, TetherError};

use crate::repo::GitRepo;

const BLOCK_START: &str = "# >>> tether >>>";
const BLOCK_END: &str = "# <<< tether <<<";
const LINK_COMMAND: &str = "tether link >/dev/null 2>&1 || true";

fn io_err(path: &Path, e: std::io::Error) -> TetherError {
    TetherError::io(format!("post-commit hook {}", path.display()), e)
}

fn tether_block() -> String {
    format!("{BLOCK_START}\n{LINK_COMMAND}\n{BLOCK_END}\n")
}

/// Remove tether's marked block, leaving foreign hook lines intact.
fn strip_block(content: &str) -> String {
    let mut out = String::new();
    let mut inside = false;
    for line in content.lines() {
        if line.trim() == BLOCK_START {
            inside = true;
            continue;
        }
        if line.trim() == BLOCK_END {
            inside = false;
            continue;
        }
        if !inside {
            out.push_str(line);
            out.push('\n');
        }
    }
    out
}

/// Only a shebang and blank lines remain.
fn is_effectively_empty(content: &str) -> bool {
    content
        .lines()
        .all(|l| l.trim().is_empty() || l.starts_with("#!"))
}

/// Add a `tether link` call to the repository's post-commit hook.
/// Idempotent: an existing tether block is replaced. Returns the hook path.
pub fn install_post_commit_hook(repo_root: &Path) -> Result<PathBuf> {
    let hooks_dir = GitRepo::at(repo_root).hooks_dir()?;
    fs::create_dir_all(&hooks_dir).map_err(|e| io_err(&hooks_dir, e))?;
    let path = hooks_dir.join("post-commit");

    let existing = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(e) => return Err(io_err(&path, e)),
    };
    let mut content = strip_block(&existing);
    if content.trim().is_empty() {
        content = "#!/bin/sh\n".to_string();
    }
    if !content.ends_with('\n') {
        content.push('\n');
    }
    content.push_str(&tether_block());
    fs::write(&path, content).map_err(|e| io_err(&path, e))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let mut perms = fs::metadata(&path).map_err(|e| io_err(&path, e))?.permissions();
        perms.set_mode(perms.mode() | 0o755);
        fs::set_permissions(&path, perms).map_err(|e| io_err(&path, e))?;
    }

    tracing::info!(hook = %path.display(), "installed post-commit hook");
    Ok(path)
}

/// Remove tether's block from the post-commit hook; deletes the file when
/// nothing else is left in it. Returns false if no hook was installed.
pub fn uninstall_post_commit_hook(repo_root: &Path) -> Result<bool> {
    let hooks_dir = GitRepo::at(repo_root).hooks_dir()?;
    let path = hooks_dir.join("post-commit");
    let existing = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(io_err(&path, e)),
    };
    if !existing.contains(BLOCK_START) {
        return Ok(false);
    }
    let remaining = strip_block(&existing);
    if is_effectively_empty(&remaining) {
        fs::remove_file(&path).map_err(|e| io_err(&path, e))?;
    } else {
        fs::write(&path, remaining).map_err(|e| io_err(&path, e))?;
    }
    Ok(true)
}
