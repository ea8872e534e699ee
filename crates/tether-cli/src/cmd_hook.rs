use std::io::Read;

use tether_store::StorePaths;

use crate::cmd_session::spawn_version_probe;

/// `tether hook claude`: read stdin, dispatch hook.
pub fn hook_claude(store: &StorePaths) -> anyhow::Result<()> {
    let mut stdin_buf = String::new();
    if let Err(e) = std::io::stdin().read_to_string(&mut stdin_buf) {
        debug_log(&format!("STDIN READ ERROR: {e}"));
        return Ok(());
    }

    debug_log(&format!(
        "STDIN({} bytes): {}",
        stdin_buf.len(),
        preview(&stdin_buf, 200)
    ));

    match tether_bridge_claude::hook_entrypoint_from_stdin(&stdin_buf, store) {
        Ok(result) => {
            match &result.probe {
                Some(probe) => {
                    debug_log(&format!("OK queued {}", probe.session_id));
                    spawn_version_probe(&probe.session_id, &probe.repo_root);
                }
                None => debug_log("OK (no change)"),
            }
            Ok(())
        }
        Err(e) => {
            debug_log(&format!("ERROR: {e}"));
            tracing::warn!(kind = ?e.kind(), error = %e, "claude hook event dropped");
            // Exit 0 on internal errors; never block the host agent.
            Ok(())
        }
    }
}

/// First `max_chars` characters, cut on a char boundary.
fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

fn debug_log(msg: &str) {
    if std::env::var_os("TETHER_DEBUG").is_none() {
        return;
    }
    use std::io::Write;
    let log_path = std::env::temp_dir().join("tether-hook-debug.log");
    if let Ok(mut f) = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
    {
        let ts = time::OffsetDateTime::now_utc()
            .format(&time::format_description::well_known::Rfc3339)
            .unwrap_or_default();
        let _ = writeln!(f, "[{ts}] {msg}");
    }
}
