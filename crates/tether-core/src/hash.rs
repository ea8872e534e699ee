use std::path::Path;

/// Number of hex characters kept from a blake3 digest for ids.
const ID_HEX_LEN: usize = 32;

/// Deterministic session id for a transcript path.
///
/// Pure function of the path text: the same transcript always maps to the same
/// id, so repeated start notifications never create a second tracked session.
pub fn session_id_for_path(transcript_path: &Path) -> String {
    let text = transcript_path.to_string_lossy();
    let hash = blake3::hash(text.as_bytes());
    hash.to_hex()[..ID_HEX_LEN].to_string()
}

/// Fresh random session id (lowercase ULID) for explicitly started sessions.
pub fn random_session_id() -> String {
    ulid::Ulid::new().to_string().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn path_id_is_deterministic() {
        let a = session_id_for_path(Path::new("/home/u/.claude/projects/x/abc.jsonl"));
        let b = session_id_for_path(Path::new("/home/u/.claude/projects/x/abc.jsonl"));
        assert_eq!(a, b);
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn different_paths_give_different_ids() {
        let a = session_id_for_path(Path::new("/t/a.jsonl"));
        let b = session_id_for_path(Path::new("/t/b.jsonl"));
        assert_ne!(a, b);
    }

    #[test]
    fn random_ids_are_unique() {
        let a = random_session_id();
        let b = random_session_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 26);
        assert_eq!(a, a.to_lowercase());
    }
}
