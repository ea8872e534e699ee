use std::process::{Command, Stdio};
use std::sync::LazyLock;

use regex::Regex;
use tether_core::{Result, SessionPatch};
use tether_store::QueueStore;

static VERSION_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^v?(\d+\.\d+(?:\.\d+)?(?:[-+][0-9A-Za-z.-]+)?)$").unwrap()
});

/// First whitespace-separated token of `--version` output that looks like a
/// version (`x.y` or `x.y.z`, optional `v` prefix and pre-release suffix).
pub fn parse_version_output(output: &str) -> Option<String> {
    output
        .split_whitespace()
        .find_map(|tok| VERSION_TOKEN.captures(tok))
        .map(|caps| caps[1].to_string())
}

/// Executable whose `--version` reports the version of `agent`.
pub fn probe_program(agent: &str) -> &str {
    match agent.trim().to_ascii_lowercase().as_str() {
        "claude" | "claude-code" => "claude",
        _ => agent.trim(),
    }
}

/// Run `<program> --version`. Any failure yields `None`.
pub fn detect_version(program: &str) -> Option<String> {
    let output = Command::new(program)
        .arg("--version")
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        tracing::debug!(program, status = %output.status, "version probe exited non-zero");
        return None;
    }
    parse_version_output(&String::from_utf8_lossy(&output.stdout))
}

/// Probe the agent of session `id` and store the version if one was found.
/// Returns the stored version; an absent session or failed probe is `None`.
pub fn record_agent_version(queue: &QueueStore, id: &str) -> Result<Option<String>> {
    let Some(session) = queue.get(id)? else {
        return Ok(None);
    };
    let Some(version) = detect_version(probe_program(&session.agent)) else {
        tracing::info!(session_id = id, agent = %session.agent, "agent version unknown");
        return Ok(None);
    };
    match queue.update(id, &SessionPatch::agent_version(&version)) {
        Ok(_) => Ok(Some(version)),
        // Relayed and removed between the lookup and the update.
        Err(tether_core::TetherError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
