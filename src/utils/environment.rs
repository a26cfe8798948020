use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the index to open when `--index` is not given
pub const INDEX_PATH_ENV: &str = "SEARCH_INDEX_PATH";

/// Where the HTML builder writes the index, relative to the docs directory
pub const DEFAULT_INDEX_RELATIVE: &str = "_build/html/searchindex.js";

/// Resolve which index file to open
///
/// Order: explicit path, then `SEARCH_INDEX_PATH`, then `_build/html/searchindex.js`
/// under `base_dir`.
pub fn resolve_index_path(explicit: Option<&Path>, base_dir: &Path) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    match env::var(INDEX_PATH_ENV) {
        Ok(value) if !value.trim().is_empty() => PathBuf::from(value),
        _ => base_dir.join(DEFAULT_INDEX_RELATIVE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_path_wins() {
        let resolved = resolve_index_path(Some(Path::new("/tmp/idx.js")), Path::new("/docs"));
        assert_eq!(resolved, PathBuf::from("/tmp/idx.js"));
    }

    #[test]
    fn test_env_then_default() {
        let original = env::var(INDEX_PATH_ENV).ok();

        // SAFETY: Setting environment variables in tests is safe as long as:
        // 1. Tests don't run in parallel accessing the same env var (only this test touches it)
        // 2. We restore the original value afterwards
        unsafe {
            env::set_var(INDEX_PATH_ENV, "/srv/docs/searchindex.js");
        }
        assert_eq!(
            resolve_index_path(None, Path::new("/docs")),
            PathBuf::from("/srv/docs/searchindex.js")
        );

        unsafe {
            env::remove_var(INDEX_PATH_ENV);
        }
        assert_eq!(
            resolve_index_path(None, Path::new("/docs")),
            PathBuf::from("/docs/_build/html/searchindex.js")
        );

        if let Some(value) = original {
            unsafe {
                env::set_var(INDEX_PATH_ENV, value);
            }
        }
    }
}
