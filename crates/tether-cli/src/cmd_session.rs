use clap::Subcommand;
use std::path::{Path, PathBuf};

use tether_core::hash::random_session_id;
use tether_core::{SessionPatch, SessionStatus, TrackedSession, UNKNOWN_VERSION};
use tether_store::{QueueStore, StorePaths};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum SessionCmd {
    /// Start tracking a session; prints only the new session id on stdout
    Start {
        /// Agent name (e.g. claude, aider)
        #[arg(long)]
        agent: String,
        /// Path to the agent's raw transcript
        #[arg(long)]
        data_path: PathBuf,
        /// Agent version; probed in the background when omitted
        #[arg(long)]
        agent_version: Option<String>,
    },
    /// Mark a session as ended
    End {
        /// Session id printed by `tether session start`
        id: String,
    },
    /// Probe and record a session's agent version
    #[command(hide = true)]
    DetectVersion {
        id: String,
        /// Repository the session belongs to
        #[arg(long)]
        cwd: Option<PathBuf>,
    },
}

// ── Dispatch ──

pub fn run(cmd: SessionCmd, store: &StorePaths, cwd: &Path) -> anyhow::Result<()> {
    match cmd {
        SessionCmd::Start {
            agent,
            data_path,
            agent_version,
        } => start(store, cwd, &agent, &data_path, agent_version.as_deref()),
        SessionCmd::End { id } => end(store, cwd, &id),
        SessionCmd::DetectVersion { id, cwd: at } => {
            detect_version(store, at.as_deref().unwrap_or(cwd), &id)
        }
    }
}

/// Repository root for `cwd`, or `cwd` itself outside git.
pub(crate) fn repo_root_or_cwd(cwd: &Path) -> PathBuf {
    tether_git::repo_root(cwd).unwrap_or_else(|_| cwd.to_path_buf())
}

/// Run `tether session detect-version` as a detached child so the caller
/// returns immediately.
pub(crate) fn spawn_version_probe(session_id: &str, repo_root: &Path) {
    // Background processes outlive the test that spawned them.
    if cfg!(test) {
        return;
    }
    let exe = match std::env::current_exe() {
        Ok(e) => e,
        Err(_) => return,
    };
    let spawned = std::process::Command::new(&exe)
        .args(["session", "detect-version", session_id, "--cwd"])
        .arg(repo_root)
        .stdin(std::process::Stdio::null())
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .spawn();
    if let Err(e) = spawned {
        tracing::debug!(session_id, error = %e, "could not spawn version probe");
    }
}

// ── Command Implementations ──

/// Queue a fresh `Open` session and return its id. Explicit starts are never
/// deduplicated.
fn start_session(
    queue: &QueueStore,
    agent: &str,
    data_path: &Path,
    agent_version: Option<&str>,
) -> anyhow::Result<String> {
    let agent = agent.trim();
    if agent.is_empty() {
        anyhow::bail!("--agent must not be empty");
    }
    let data_path = std::path::absolute(data_path)?;
    let id = random_session_id();
    let version = agent_version
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(UNKNOWN_VERSION);
    queue.add(TrackedSession::open(&id, agent, version, data_path))?;
    Ok(id)
}

/// `tether session start`
pub fn start(
    store: &StorePaths,
    cwd: &Path,
    agent: &str,
    data_path: &Path,
    agent_version: Option<&str>,
) -> anyhow::Result<()> {
    let root = repo_root_or_cwd(cwd);
    let id = start_session(&store.queue_for(&root), agent, data_path, agent_version)?;
    if agent_version.is_none() {
        spawn_version_probe(&id, &root);
    }
    // The id is the only thing written to stdout.
    println!("{id}");
    eprintln!("Tracking {agent} session {id}");
    Ok(())
}

/// `tether session end <id>`
pub fn end(store: &StorePaths, cwd: &Path, id: &str) -> anyhow::Result<()> {
    let queue = store.queue_for(&repo_root_or_cwd(cwd));
    queue.update(id, &SessionPatch::status(SessionStatus::Ended))?;
    eprintln!("Ended session {id}");
    Ok(())
}

/// `tether session detect-version <id>`. Detection failure leaves the
/// version as it was and still exits 0.
pub fn detect_version(store: &StorePaths, cwd: &Path, id: &str) -> anyhow::Result<()> {
    let queue = store.queue_for(&repo_root_or_cwd(cwd));
    match tether_bridge_claude::record_agent_version(&queue, id) {
        Ok(Some(version)) => tracing::info!(session_id = id, %version, "agent version recorded"),
        Ok(None) => {}
        Err(e) => tracing::warn!(session_id = id, error = %e, "could not record agent version"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_starts_always_create_new_sessions() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = QueueStore::open(tmp.path());
        let path = tmp.path().join("t.log");

        let a = start_session(&queue, "aider", &path, Some("0.86.1")).unwrap();
        let b = start_session(&queue, "aider", &path, None).unwrap();
        assert_ne!(a, b);

        let sessions = queue.list().unwrap();
        assert_eq!(sessions.len(), 2);
        assert_eq!(sessions[0].agent_version, "0.86.1");
        assert_eq!(sessions[1].agent_version, UNKNOWN_VERSION);
        assert!(sessions.iter().all(|s| s.is_open() && s.data_path.is_absolute()));
    }

    #[test]
    fn relative_data_path_is_made_absolute() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = QueueStore::open(tmp.path());
        let id = start_session(&queue, "aider", Path::new("t.log"), None).unwrap();
        let session = queue.get(&id).unwrap().unwrap();
        assert!(session.data_path.is_absolute());
        assert!(session.data_path.ends_with("t.log"));
    }

    #[test]
    fn empty_agent_is_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let queue = QueueStore::open(tmp.path());
        assert!(start_session(&queue, "  ", Path::new("/t/x"), None).is_err());
        assert!(queue.list().unwrap().is_empty());
    }

    #[test]
    fn end_marks_session_ended_and_unknown_id_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let store = StorePaths::at(tmp.path().join("store"));
        let work = tmp.path().join("work");
        std::fs::create_dir_all(&work).unwrap();
        let queue = store.queue_for(&repo_root_or_cwd(&work));
        let id = start_session(&queue, "aider", &work.join("t.log"), None).unwrap();

        end(&store, &work, &id).unwrap();
        assert!(!queue.get(&id).unwrap().unwrap().is_open());
        assert!(end(&store, &work, "missing").is_err());
    }
}
