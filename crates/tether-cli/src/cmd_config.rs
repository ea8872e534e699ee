use clap::Subcommand;
use serde_json::Value;

use tether_store::{StorePaths, UserConfig};

/// Keys whose values are never echoed in full.
const SECRET_KEYS: &[&str] = &["api_token"];

/// Keys stored verbatim as strings, whatever they look like.
const STRING_KEYS: &[&str] = &["api_url", "api_token", "repo"];

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Set a config value
    Set {
        /// Config key (api_url, api_token, repo)
        key: String,
        /// Config value (true/false/number/string)
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// Remove a config value
    Unset {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd, store: &StorePaths) -> anyhow::Result<()> {
    let mut config = UserConfig::load(&store.config_json())?;
    match cmd {
        ConfigCmd::Set { key, value } => {
            let value = if STRING_KEYS.contains(&key.as_str()) {
                Value::String(value)
            } else {
                parse_value(&value)
            };
            println!("{key} = {}", display_value(&key, &value));
            config.set(&key, value);
            config.save()?;
        }
        ConfigCmd::Get { key } => match config.get(&key) {
            Some(val) => println!("{}", display_value(&key, val)),
            None => println!("(not set)"),
        },
        ConfigCmd::Unset { key } => {
            if config.remove(&key).is_some() {
                config.save()?;
                println!("{key} removed");
            } else {
                println!("(not set)");
            }
        }
        ConfigCmd::List => {
            let mut any = false;
            for (k, v) in config.entries() {
                any = true;
                println!("{k} = {}", display_value(k, v));
            }
            if !any {
                println!("(no config set)");
            }
        }
    }
    Ok(())
}

// ── Helpers ──

/// Parse a string value into an appropriate JSON value (bool/number/string).
fn parse_value(s: &str) -> Value {
    match s {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(n) = s.parse::<i64>() {
                Value::Number(n.into())
            } else if let Ok(f) = s.parse::<f64>() {
                serde_json::json!(f)
            } else {
                Value::String(s.to_string())
            }
        }
    }
}

fn display_value(key: &str, value: &Value) -> String {
    if !SECRET_KEYS.contains(&key) {
        return value.to_string();
    }
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    mask(&text)
}

/// Keep the last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("****{tail}")
}
