use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::debug;

use crate::models::SearchIndex;
use crate::utils::validate_file_size;

/// The call the HTML builder wraps the index payload in
pub const SET_INDEX_CALL: &str = "Search.setIndex(";

/// Parse the text of a `searchindex.js` file
///
/// Accepts the generator's `Search.setIndex({...})` wrapper (with or without a
/// trailing `;`) as well as a bare JSON object.
///
/// # Errors
///
/// Returns an error if the wrapper is malformed or the payload is not a valid index.
pub fn parse_search_index(text: &str) -> Result<SearchIndex> {
    let payload = extract_payload(text)?;
    serde_json::from_str(payload).context("Failed to parse search index payload")
}

/// Strip the JavaScript call around the JSON object
fn extract_payload(text: &str) -> Result<&str> {
    let trimmed = text.trim_start_matches('\u{feff}').trim();

    if trimmed.is_empty() {
        bail!("Search index is empty");
    }

    if trimmed.starts_with('{') {
        return Ok(trimmed);
    }

    let Some(rest) = trimmed.strip_prefix(SET_INDEX_CALL) else {
        bail!("Expected a `{}...)` call or a JSON object", SET_INDEX_CALL);
    };

    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    let Some(payload) = rest.strip_suffix(')') else {
        bail!("Unterminated `{}` call", SET_INDEX_CALL);
    };

    Ok(payload.trim())
}

/// Load and parse a `searchindex.js` file from disk
///
/// # Errors
///
/// Returns an error if the file cannot be opened, is larger than the size limit,
/// is not UTF-8, or does not contain a valid index.
pub fn load_search_index(path: &Path) -> Result<SearchIndex> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open search index: {}", path.display()))?;
    validate_file_size(&file, path)?;

    let mut text = String::new();
    BufReader::new(file)
        .read_to_string(&mut text)
        .with_context(|| format!("Failed to read search index: {}", path.display()))?;

    let index = parse_search_index(&text)
        .with_context(|| format!("Invalid search index: {}", path.display()))?;

    debug!(
        path = %path.display(),
        documents = index.document_count(),
        terms = index.terms.len(),
        objects = index.object_count(),
        "Loaded search index"
    );

    Ok(index)
}
