use tether_core::Enrichment;

/// Assemble the plain-text search document for a session.
///
/// Excerpts come first, then a `files:` line per changed path, then the
/// enrichment fields. Returns `None` when there are no excerpts: without
/// conversation text there is nothing worth indexing.
pub fn build_search_text(
    excerpts: &[String],
    files: &[String],
    enrichment: &Enrichment,
) -> Option<String> {
    let parts: Vec<&str> = excerpts
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .collect();
    if parts.is_empty() {
        return None;
    }

    let mut out = parts.join("\n");

    for file in files {
        out.push_str("\nfiles: ");
        out.push_str(file);
    }
    if let Some(name) = &enrichment.session_name {
        out.push('\n');
        out.push_str(name);
    }
    if let Some(first) = &enrichment.first_message {
        out.push('\n');
        out.push_str(first);
    }
    Some(out)
}
