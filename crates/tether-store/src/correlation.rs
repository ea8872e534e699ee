//! Correlation records: one file per open external tool session, mapping the
//! tool's own session id to the internal tracked-session id.
//!
//! A missing record always means "never tracked".

use std::fs;
use std::path::{Path, PathBuf};
use tether_core::{Result, TetherError};

fn correlation_path(state_dir: &Path, external_id: &str) -> PathBuf {
    state_dir.join(format!("correlation.{}", file_safe(external_id)))
}

/// External ids come from another tool; anything that is not a plain token is
/// hashed so it can never escape the state directory.
fn file_safe(external_id: &str) -> String {
    let plain = !external_id.is_empty()
        && external_id.len() <= 128
        && external_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if plain {
        external_id.to_string()
    } else {
        blake3::hash(external_id.as_bytes()).to_hex()[..32].to_string()
    }
}

pub fn write_correlation(state_dir: &Path, external_id: &str, internal_id: &str) -> Result<()> {
    let path = correlation_path(state_dir, external_id);
    crate::write_atomic(&path, internal_id.as_bytes())
        .map_err(|e| TetherError::io(format!("write {}", path.display()), e))
}

pub fn read_correlation(state_dir: &Path, external_id: &str) -> Result<Option<String>> {
    let path = correlation_path(state_dir, external_id);
    match fs::read_to_string(&path) {
        Ok(s) => {
            let id = s.trim();
            Ok((!id.is_empty()).then(|| id.to_string()))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(TetherError::io(format!("read {}", path.display()), e)),
    }
}

/// Delete the record. Deleting an absent record is not an error.
pub fn remove_correlation(state_dir: &Path, external_id: &str) -> Result<()> {
    let path = correlation_path(state_dir, external_id);
    match fs::remove_file(&path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(TetherError::io(format!("remove {}", path.display()), e)),
    }
}
