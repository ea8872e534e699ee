mod config;
mod correlation;
mod queue;

pub use config::UserConfig;
pub use correlation::{read_correlation, remove_correlation, write_correlation};
pub use queue::QueueStore;

use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Compute a deterministic project ID from a repo root.
/// project_id = blake3(normalize_path(input)) → hex string (first 32 chars).
pub fn project_id(repo_root: &Path) -> String {
    let normalized = normalize_path(repo_root);
    let hash = blake3::hash(normalized.as_bytes());
    hash.to_hex()[..32].to_string()
}

/// Normalize a path: canonicalize, lowercase on Windows, forward slashes.
fn normalize_path(p: &Path) -> String {
    let abs = p
        .canonicalize()
        .unwrap_or_else(|_| p.to_path_buf())
        .to_string_lossy()
        .to_string();
    #[cfg(windows)]
    let abs = abs.to_lowercase();
    abs.replace('\\', "/")
}

/// Well-known locations inside the per-user store.
#[derive(Debug, Clone)]
pub struct StorePaths {
    pub root: PathBuf,
}

impl StorePaths {
    /// `TETHER_HOME` if set, else the platform data dir (`~/.local/share/tether`,
    /// `%APPDATA%\tether`), else `~/.tether`.
    pub fn discover() -> Self {
        if let Some(home) = std::env::var_os("TETHER_HOME") {
            return Self::at(PathBuf::from(home));
        }
        let root = if let Some(data_dir) = dirs::data_dir() {
            data_dir.join("tether")
        } else if let Some(home) = dirs::home_dir() {
            home.join(".tether")
        } else {
            PathBuf::from(".tether-store")
        };
        Self::at(root)
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn config_json(&self) -> PathBuf {
        self.root.join("config.json")
    }

    /// `root/projects/<project_id>/`
    pub fn project_dir(&self, project_id: &str) -> PathBuf {
        self.root.join("projects").join(project_id)
    }

    /// `root/projects/<project_id>/state/`
    pub fn state_dir(&self, project_id: &str) -> PathBuf {
        self.project_dir(project_id).join("state")
    }

    /// Queue for the repository whose working tree is rooted at `repo_root`.
    pub fn queue_for(&self, repo_root: &Path) -> QueueStore {
        QueueStore::open(self.project_dir(&project_id(repo_root)))
    }
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("no parent dir for {}", path.display()),
        )
    })?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

/// File-based exclusive lock guard. Released on drop.
pub struct LockGuard {
    _file: fs::File,
}

/// Acquire an exclusive file lock, blocking until it is free.
/// Creates the lock file if needed.
pub fn lock_file(path: &Path) -> std::io::Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(LockGuard { _file: file })
}
