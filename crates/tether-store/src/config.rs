use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tether_core::{Result, TetherError};

/// Flat key/value user configuration stored at `<store root>/config.json`.
#[derive(Debug, Clone, Default)]
pub struct UserConfig {
    path: PathBuf,
    values: Map<String, Value>,
}

impl UserConfig {
    /// Load config. Returns an empty config if the file doesn't exist.
    pub fn load(path: &Path) -> Result<Self> {
        let values = match std::fs::read_to_string(path) {
            Ok(content) if content.trim().is_empty() => Map::new(),
            Ok(content) => match serde_json::from_str(&content)? {
                Value::Object(map) => map,
                _ => Map::new(),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => return Err(TetherError::io(format!("read {}", path.display()), e)),
        };
        Ok(Self {
            path: path.to_path_buf(),
            values,
        })
    }

    /// String value for `key`; numbers and booleans are rendered as text.
    pub fn get_str(&self, key: &str) -> Option<String> {
        match self.values.get(key)? {
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Null => None,
            other => Some(other.to_string()),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    pub fn save(&self) -> Result<()> {
        let json = serde_json::to_string_pretty(&self.values)?;
        crate::write_atomic(&self.path, json.as_bytes())
            .map_err(|e| TetherError::io(format!("write {}", self.path.display()), e))
    }
}
