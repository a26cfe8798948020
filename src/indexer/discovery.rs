use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use tracing::{debug, warn};
use walkdir::{DirEntry, WalkDir};

/// File extensions treated as documentation sources
pub const SOURCE_EXTENSIONS: &[&str] = &["rst", "md", "txt"];

/// Build output directory the generator writes into the source tree
const BUILD_DIR: &str = "_build";

/// Maximum number of sources to collect (prevents runaway walks over huge trees)
const MAX_SOURCES: usize = 10_000;

fn is_skipped_dir(entry: &DirEntry) -> bool {
    if entry.depth() == 0 || !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == BUILD_DIR
}

fn is_source_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext))
}

/// Find every documentation source below `root`
///
/// Hidden directories and `_build` are not descended into. Paths are returned
/// sorted, which is also docname order.
///
/// # Errors
///
/// Returns an error if `root` is not a directory or more than 10,000 sources
/// are found. Unreadable entries below the root are logged and skipped.
pub fn discover_sources(root: &Path) -> Result<Vec<PathBuf>> {
    if !root.is_dir() {
        bail!("Documentation source directory not found: {}", root.display());
    }

    let mut sources = Vec::new();
    for entry in WalkDir::new(root).follow_links(false).into_iter().filter_entry(|e| !is_skipped_dir(e))
    {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(e).with_context(|| format!("Failed to read {}", root.display()));
            }
            Err(e) => {
                warn!("Skipping unreadable path: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !is_source_file(entry.path()) {
            continue;
        }

        sources.push(entry.into_path());
        if sources.len() > MAX_SOURCES {
            bail!("Too many source files (>{}) under {}", MAX_SOURCES, root.display());
        }
    }

    sources.sort();
    debug!(root = %root.display(), count = sources.len(), "Discovered documentation sources");
    Ok(sources)
}
