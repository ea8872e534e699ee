use std::fs;
use std::path::{Path, PathBuf};

use crate::parse::now_rfc3339;

// ── Install / Uninstall ──

const TETHER_HOOK_COMMAND: &str = "tether hook claude";

/// Hook events tether listens to.
const HOOK_EVENTS: &[&str] = &["SessionStart", "SessionEnd"];

/// Check if a matcher group (Claude Code hook format) contains a tether hook.
fn matcher_group_contains_tether(group: &serde_json::Value) -> bool {
    // { "matcher": "", "hooks": [{ "type": "command", "command": "tether hook claude" }] }
    if let Some(hooks_arr) = group.get("hooks").and_then(|h| h.as_array()) {
        return hooks_arr.iter().any(|hook| {
            hook.get("command")
                .and_then(|c| c.as_str())
                .is_some_and(|cmd| cmd.contains("tether hook"))
        });
    }
    group.as_str().is_some_and(|s| s.contains("tether hook"))
}

fn settings_path(repo_root: &Path) -> PathBuf {
    repo_root.join(".claude").join("settings.local.json")
}

fn read_settings(path: &Path) -> anyhow::Result<serde_json::Value> {
    if !path.exists() {
        return Ok(serde_json::json!({}));
    }
    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    let settings: serde_json::Value = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("{} is not valid JSON: {e}", path.display()))?;
    if !settings.is_object() {
        anyhow::bail!("{} is not a JSON object", path.display());
    }
    Ok(settings)
}

/// Install tether's session hooks into `.claude/settings.local.json`.
/// Foreign hooks are preserved; an existing file is backed up first.
/// Returns the settings path.
pub fn install(repo_root: &Path) -> anyhow::Result<PathBuf> {
    let path = settings_path(repo_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let mut settings = read_settings(&path)?;

    if path.exists() {
        let ts = now_rfc3339().replace(':', "-");
        let backup = path.with_extension(format!("json.tether.bak.{ts}"));
        fs::copy(&path, &backup)?;
    }

    let hooks = settings
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("settings is not an object"))?
        .entry("hooks")
        .or_insert_with(|| serde_json::json!({}));
    let hooks_obj = hooks
        .as_object_mut()
        .ok_or_else(|| anyhow::anyhow!("hooks is not an object"))?;

    for event_name in HOOK_EVENTS {
        let tether_group = serde_json::json!({
            "matcher": "",
            "hooks": [
                {
                    "type": "command",
                    "command": TETHER_HOOK_COMMAND
                }
            ]
        });

        let mut groups: Vec<serde_json::Value> = hooks_obj
            .get(*event_name)
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|group| !matcher_group_contains_tether(group))
            .collect();
        groups.push(tether_group);
        hooks_obj.insert(event_name.to_string(), serde_json::Value::Array(groups));
    }

    let output = serde_json::to_string_pretty(&settings)?;
    fs::write(&path, output.as_bytes())?;
    tracing::info!(settings = %path.display(), "installed claude hooks");
    Ok(path)
}

/// Remove tether's hooks from `.claude/settings.local.json`, dropping event
/// keys and the `hooks` object when they end up empty. Returns false when
/// there was no settings file.
pub fn uninstall(repo_root: &Path) -> anyhow::Result<bool> {
    let path = settings_path(repo_root);
    if !path.exists() {
        return Ok(false);
    }
    let mut settings = read_settings(&path)?;

    let mut hooks_now_empty = false;
    if let Some(hooks) = settings.get_mut("hooks").and_then(|h| h.as_object_mut()) {
        for event_name in HOOK_EVENTS {
            if let Some(arr) = hooks.get(*event_name).and_then(|v| v.as_array()).cloned() {
                let filtered: Vec<serde_json::Value> = arr
                    .into_iter()
                    .filter(|v| !matcher_group_contains_tether(v))
                    .collect();
                if filtered.is_empty() {
                    hooks.remove(*event_name);
                } else {
                    hooks.insert(event_name.to_string(), serde_json::Value::Array(filtered));
                }
            }
        }
        hooks_now_empty = hooks.is_empty();
    }
    if hooks_now_empty {
        if let Some(obj) = settings.as_object_mut() {
            obj.remove("hooks");
        }
    }

    let output = serde_json::to_string_pretty(&settings)?;
    fs::write(&path, output.as_bytes())?;
    tracing::info!(settings = %path.display(), "uninstalled claude hooks");
    Ok(true)
}

/// True when every tether hook event is wired up in the settings file.
pub fn is_installed(repo_root: &Path) -> bool {
    let Ok(settings) = read_settings(&settings_path(repo_root)) else {
        return false;
    };
    HOOK_EVENTS.iter().all(|event| {
        settings["hooks"][*event]
            .as_array()
            .is_some_and(|groups| groups.iter().any(matcher_group_contains_tether))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(path: &Path) -> serde_json::Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn install_then_uninstall_roundtrip() {
        let tmp = tempfile::tempdir().unwrap();
        let path = install(tmp.path()).unwrap();
        assert!(is_installed(tmp.path()));

        let settings = load(&path);
        for event in HOOK_EVENTS {
            let groups = settings["hooks"][*event].as_array().unwrap();
            assert_eq!(groups.len(), 1);
            assert_eq!(
                groups[0]["hooks"][0]["command"].as_str().unwrap(),
                "tether hook claude"
            );
        }

        assert!(uninstall(tmp.path()).unwrap());
        assert!(!is_installed(tmp.path()));
        assert!(load(&path).get("hooks").is_none());
    }

    #[test]
    fn install_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        install(tmp.path()).unwrap();
        let path = install(tmp.path()).unwrap();
        let settings = load(&path);
        assert_eq!(settings["hooks"]["SessionStart"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn foreign_hooks_and_keys_survive() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");
        fs::create_dir_all(&claude_dir).unwrap();
        let path = claude_dir.join("settings.local.json");
        fs::write(
            &path,
            serde_json::json!({
                "permissions": {"allow": ["Bash(ls)"]},
                "hooks": {
                    "SessionStart": [
                        {"matcher": "", "hooks": [{"type": "command", "command": "other-tool start"}]}
                    ]
                }
            })
            .to_string(),
        )
        .unwrap();

        install(tmp.path()).unwrap();
        let settings = load(&path);
        assert_eq!(settings["hooks"]["SessionStart"].as_array().unwrap().len(), 2);
        assert_eq!(settings["permissions"]["allow"][0], "Bash(ls)");

        let backups = fs::read_dir(&claude_dir)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().contains(".tether.bak."))
            .count();
        assert_eq!(backups, 1);

        uninstall(tmp.path()).unwrap();
        let settings = load(&path);
        let start = settings["hooks"]["SessionStart"].as_array().unwrap();
        assert_eq!(start.len(), 1);
        assert_eq!(start[0]["hooks"][0]["command"], "other-tool start");
        assert!(settings["hooks"].get("SessionEnd").is_none());
    }

    #[test]
    fn uninstall_without_settings_is_false() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(!uninstall(tmp.path()).unwrap());
    }

    #[test]
    fn invalid_settings_are_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        let claude_dir = tmp.path().join(".claude");
        fs::create_dir_all(&claude_dir).unwrap();
        let path = claude_dir.join("settings.local.json");
        fs::write(&path, "{ broken").unwrap();
        assert!(install(tmp.path()).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{ broken");
    }
}
