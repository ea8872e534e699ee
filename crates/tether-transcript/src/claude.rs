//! Claude Code transcript extractor.
//!
//! Expected format per line:
//! ```json
//! {"type":"user","message":{"content":"hello"}}
//! {"type":"assistant","message":{"content":[{"type":"text","text":"..."},{"type":"tool_use",...}]}}
//! {"type":"summary","summary":"Fix flaky parser test"}
//! ```

use tether_core::Enrichment;

use crate::Extractor;

const FIRST_MESSAGE_MAX_CHARS: usize = 500;

pub struct ClaudeExtractor;

fn records(raw: &str) -> impl Iterator<Item = serde_json::Value> + '_ {
    raw.lines()
        .filter(|l| !l.trim().is_empty())
        .filter_map(|l| serde_json::from_str::<serde_json::Value>(l).ok())
}

fn record_type(v: &serde_json::Value) -> &str {
    v.get("type").and_then(|t| t.as_str()).unwrap_or("")
}

/// Text of a `message.content` field: either a plain string or an array of
/// blocks of which only `"type":"text"` blocks are kept.
fn message_text(v: &serde_json::Value) -> Option<String> {
    let content = v.get("message")?.get("content")?;
    if let Some(s) = content.as_str() {
        return Some(s.to_string());
    }
    let texts: Vec<&str> = content
        .as_array()?
        .iter()
        .filter(|b| b.get("type").and_then(|t| t.as_str()) == Some("text"))
        .filter_map(|b| b.get("text").and_then(|t| t.as_str()))
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n"))
    }
}

/// Slash-command wrappers and injected meta records are not conversation.
fn is_human_prompt(v: &serde_json::Value, text: &str) -> bool {
    if v.get("isMeta").and_then(|m| m.as_bool()) == Some(true) {
        return false;
    }
    let t = text.trim_start();
    !(t.is_empty() || t.starts_with("<command-") || t.starts_with("<local-command-"))
}

const ELLIPSIS: &str = "...";

/// At most `max_chars` characters, ellipsis included.
fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(ELLIPSIS.len());
    let idx = text.char_indices().nth(keep).map_or(text.len(), |(i, _)| i);
    format!("{}{ELLIPSIS}", &text[..idx])
}

impl Extractor for ClaudeExtractor {
    fn enrichment(&self, raw: &str) -> Enrichment {
        let mut first_message = None;
        let mut session_name = None;
        for rec in records(raw) {
            match record_type(&rec) {
                "user" if first_message.is_none() => {
                    if let Some(text) = message_text(&rec) {
                        if is_human_prompt(&rec, &text) {
                            first_message = Some(truncate(text.trim(), FIRST_MESSAGE_MAX_CHARS));
                        }
                    }
                }
                "summary" => {
                    if let Some(s) = rec.get("summary").and_then(|s| s.as_str()) {
                        session_name = Some(s.to_string());
                    }
                }
                _ => {}
            }
        }
        Enrichment {
            first_message,
            session_name,
        }
    }

    fn excerpts(&self, raw: &str) -> Vec<String> {
        records(raw)
            .filter_map(|rec| match record_type(&rec) {
                "user" => message_text(&rec).filter(|t| is_human_prompt(&rec, t)),
                "assistant" => message_text(&rec),
                _ => None,
            })
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSCRIPT: &str = r#"{"type":"user","isMeta":true,"message":{"content":"Caveat: injected"}}
{"type":"user","message":{"content":"<command-name>/clear</command-name>"}}
{"type":"user","message":{"content":"Fix the flaky parser test"}}
{"type":"assistant","message":{"content":[{"type":"text","text":"Looking at it."},{"type":"tool_use","name":"Read"}]}}
{"type":"user","message":{"content":[{"type":"tool_result","content":"file body"}]}}
not json at all
{"type":"assistant","message":{"content":[{"type":"text","text":"Fixed."}]}}
{"type":"summary","summary":"Parser test fix"}
"#;

    #[test]
    fn enrichment_picks_first_human_prompt_and_summary() {
        let e = ClaudeExtractor.enrichment(TRANSCRIPT);
        assert_eq!(e.first_message.as_deref(), Some("Fix the flaky parser test"));
        assert_eq!(e.session_name.as_deref(), Some("Parser test fix"));
    }

    #[test]
    fn excerpts_skip_tools_meta_and_garbage() {
        let ex = ClaudeExtractor.excerpts(TRANSCRIPT);
        assert_eq!(ex, ["Fix the flaky parser test", "Looking at it.", "Fixed."]);
    }

    #[test]
    fn empty_transcript() {
        assert_eq!(ClaudeExtractor.enrichment(""), Enrichment::default());
        assert!(ClaudeExtractor.excerpts("").is_empty());
    }

    #[test]
    fn long_first_message_is_truncated_on_char_boundary() {
        let long = "é".repeat(600);
        let raw = format!(r#"{{"type":"user","message":{{"content":"{long}"}}}}"#);
        let first = ClaudeExtractor.enrichment(&raw).first_message.unwrap();
        assert!(first.ends_with("..."));
        assert_eq!(first.chars().count(), 500);
    }

    #[test]
    fn message_at_the_limit_is_kept_whole() {
        let exact = "a".repeat(FIRST_MESSAGE_MAX_CHARS);
        assert_eq!(truncate(&exact, FIRST_MESSAGE_MAX_CHARS), exact);
        assert_eq!(truncate(&format!("{exact}b"), FIRST_MESSAGE_MAX_CHARS).len(), FIRST_MESSAGE_MAX_CHARS);
    }
}
