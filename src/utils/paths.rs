use std::env;
use std::fs::File;
use std::path::{Component, Path};

use anyhow::{Context, Result, bail};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// Generated indexes for large projects run to a few MB; anything past this is not an index
const MAX_FILE_SIZE_BYTES: u64 = 64 * 1024 * 1024;

/// Suffix the HTML builder appends to every docname
pub const HTML_SUFFIX: &str = ".html";

// Characters to percent-encode inside a single docname segment
const SEGMENT_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'`')
    .add(b'?')
    .add(b'{')
    .add(b'}');

/// Builds the relative link for a docname and an optional `#anchor`
///
/// Each `/`-separated segment of the docname is percent-encoded on its own so
/// nested documents keep their directory structure.
///
/// # Examples
///
/// ```
/// use search_index_explorer::utils::paths::document_url;
///
/// assert_eq!(document_url("api/experiment", "#pkg.run"), "api/experiment.html#pkg.run");
/// assert_eq!(document_url("getting started", ""), "getting%20started.html");
/// ```
pub fn document_url(docname: &str, anchor: &str) -> String {
    let encoded: Vec<String> = docname
        .split('/')
        .map(|segment| utf8_percent_encode(segment, SEGMENT_ENCODE_SET).to_string())
        .collect();
    format!("{}{}{}", encoded.join("/"), HTML_SUFFIX, anchor)
}

/// Converts a source path relative to the documentation root into a docname
///
/// The extension is dropped and separators are normalized to `/`.
///
/// # Errors
///
/// Returns an error for absolute paths or paths containing `..`.
pub fn docname_from_relative(relative: &Path) -> Result<String> {
    let mut parts = Vec::new();
    for component in relative.with_extension("").components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            _ => bail!("Source path escapes the documentation root: {}", relative.display()),
        }
    }
    if parts.is_empty() {
        bail!("Empty source path");
    }
    Ok(parts.join("/"))
}

/// Validates that an open file is not larger than an index could reasonably be
///
/// Checking the already-open handle avoids a check-then-open race.
///
/// # Errors
///
/// Returns an error if:
/// - The file metadata cannot be read
/// - The file is larger than 64MB
pub fn validate_file_size(file: &File, path: &Path) -> Result<()> {
    let metadata = file
        .metadata()
        .with_context(|| format!("Failed to read file metadata: {}", path.display()))?;

    let file_size = metadata.len();
    if file_size > MAX_FILE_SIZE_BYTES {
        bail!(
            "File too large: {} ({} bytes, max {} bytes)",
            path.display(),
            file_size,
            MAX_FILE_SIZE_BYTES
        );
    }

    Ok(())
}

/// Shortens an index path for display by replacing the home directory with `~`
pub fn format_path_with_tilde(path: &Path) -> String {
    format_path_with_tilde_internal(path, None)
}

pub(crate) fn format_path_with_tilde_internal(path: &Path, home_override: Option<&str>) -> String {
    let home_from_env =
        env::var("HOME").ok().or_else(|| dirs::home_dir().map(|h| h.to_string_lossy().into()));
    let home = home_override.or(home_from_env.as_deref());

    let path_str = path.to_string_lossy();
    if let Some(home) = home
        && !home.is_empty()
        && path_str.starts_with(home)
    {
        return path_str.replacen(home, "~", 1);
    }

    path_str.into_owned()
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn test_document_url_plain() {
        assert_eq!(document_url("index", ""), "index.html");
        assert_eq!(document_url("index", "#indices-and-tables"), "index.html#indices-and-tables");
    }

    #[test]
    fn test_document_url_nested_and_encoded() {
        assert_eq!(document_url("api/my module", "#x"), "api/my%20module.html#x");
        assert_eq!(document_url("100%", ""), "100%25.html");
    }

    #[test]
    fn test_docname_from_relative() {
        assert_eq!(docname_from_relative(Path::new("index.rst")).unwrap(), "index");
        assert_eq!(
            docname_from_relative(Path::new("./api/experiment.rst")).unwrap(),
            "api/experiment"
        );
    }

    #[test]
    fn test_docname_rejects_traversal() {
        assert!(docname_from_relative(Path::new("../secret.rst")).is_err());
        assert!(docname_from_relative(Path::new("/abs/index.rst")).is_err());
        assert!(docname_from_relative(Path::new("")).is_err());
    }

    #[test]
    fn test_validate_file_size_small_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"Search.setIndex({})").unwrap();
        let handle = File::open(file.path()).unwrap();
        assert!(validate_file_size(&handle, file.path()).is_ok());
    }

    #[test]
    fn test_format_path_with_tilde() {
        let path = PathBuf::from("/Users/testuser/docs/_build/html/searchindex.js");
        let formatted = format_path_with_tilde_internal(&path, Some("/Users/testuser"));
        assert_eq!(formatted, "~/docs/_build/html/searchindex.js");

        // Path not under home
        let path2 = PathBuf::from("/opt/docs/searchindex.js");
        let formatted2 = format_path_with_tilde_internal(&path2, Some("/Users/testuser"));
        assert_eq!(formatted2, "/opt/docs/searchindex.js");

        let path3 = PathBuf::from("/some/random/path");
        assert!(!format_path_with_tilde_internal(&path3, None).is_empty());
    }
}
