use std::path::{Path, PathBuf};

use tether_core::{Result, TetherError};

// ── Hook stdin parsing ──

/// Parse the stdin JSON from a Claude Code hook.
pub(crate) fn parse_hook_stdin(stdin: &str) -> Result<serde_json::Value> {
    let val: serde_json::Value = serde_json::from_str(stdin)
        .map_err(|e| TetherError::Parse(format!("hook payload: {e}")))?;
    if !val.is_object() {
        return Err(TetherError::Parse("hook payload is not a JSON object".into()));
    }
    Ok(val)
}

/// Get a string field from JSON, trying snake_case first then camelCase.
/// Claude Code documents snake_case keys but some versions send camelCase.
pub(crate) fn get_str(v: &serde_json::Value, snake_key: &str) -> String {
    if let Some(s) = v.get(snake_key).and_then(|x| x.as_str()) {
        return s.to_string();
    }
    let camel = snake_to_camel(snake_key);
    v.get(&camel)
        .and_then(|x| x.as_str())
        .unwrap_or("")
        .to_string()
}

pub(crate) fn snake_to_camel(s: &str) -> String {
    let mut result = String::new();
    let mut capitalize_next = false;
    for ch in s.chars() {
        if ch == '_' {
            capitalize_next = true;
        } else if capitalize_next {
            result.extend(ch.to_uppercase());
            capitalize_next = false;
        } else {
            result.push(ch);
        }
    }
    result
}

/// The hook's `cwd`, or this process's directory when the payload has none.
pub(crate) fn hook_dir(cwd: &str) -> PathBuf {
    if cwd.is_empty() {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
    } else {
        PathBuf::from(cwd)
    }
}

/// Working-tree root for the hook's `cwd`; the directory itself outside git.
pub(crate) fn resolve_repo_root(cwd: &str) -> PathBuf {
    let dir = hook_dir(cwd);
    tether_git::repo_root(&dir).unwrap_or(dir)
}

pub(crate) fn now_rfc3339() -> String {
    let now = time::OffsetDateTime::now_utc();
    now.format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| now.unix_timestamp().to_string())
}

/// Transcript paths from the hook are used verbatim when absolute; relative
/// ones are resolved against the hook's working directory.
pub(crate) fn absolute_transcript(path: &str, cwd: &Path) -> PathBuf {
    let p = PathBuf::from(path);
    if p.is_absolute() {
        p
    } else {
        cwd.join(p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_to_camel_converts_correctly() {
        assert_eq!(snake_to_camel("hook_event_name"), "hookEventName");
        assert_eq!(snake_to_camel("session_id"), "sessionId");
        assert_eq!(snake_to_camel("transcript_path"), "transcriptPath");
        assert_eq!(snake_to_camel("cwd"), "cwd");
    }

    #[test]
    fn get_str_accepts_both_casings() {
        let snake = serde_json::json!({"session_id": "s1"});
        let camel = serde_json::json!({"sessionId": "s2"});
        assert_eq!(get_str(&snake, "session_id"), "s1");
        assert_eq!(get_str(&camel, "session_id"), "s2");
        assert_eq!(get_str(&camel, "transcript_path"), "");
    }

    #[test]
    fn malformed_payload_is_parse_error() {
        let err = parse_hook_stdin("{not json").unwrap_err();
        assert_eq!(err.kind(), tether_core::ErrorKind::Parse);
        assert!(parse_hook_stdin("[1,2]").is_err());
    }

    #[cfg(unix)]
    #[test]
    fn relative_transcript_joins_cwd() {
        let cwd = Path::new("/work/repo");
        assert_eq!(
            absolute_transcript("t/x.jsonl", cwd),
            PathBuf::from("/work/repo/t/x.jsonl")
        );
    }
}
