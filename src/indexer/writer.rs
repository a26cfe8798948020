//! Serialization in the generator's exact byte format.
//!
//! The generator writes `Search.setIndex(` + `json.dumps(index, sort_keys=True)` + `)`.
//! That JSON differs from `serde_json`'s compact output in two ways:
//!
//! - Separators are `", "` between items and `": "` between keys and values
//! - Every character outside printable ASCII is escaped as lowercase `\uXXXX`,
//!   using surrogate pairs above the Basic Multilingual Plane
//!
//! Key order needs no special handling: every map in [`SearchIndex`] is a
//! `BTreeMap` and struct fields are declared in sorted order.

use std::fs;
use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::ser::Formatter;
use tracing::debug;

use crate::models::SearchIndex;
use crate::parsers::searchindex::SET_INDEX_CALL;

/// `serde_json` formatter matching Python's default `json.dumps` output
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonFormatter;

impl Formatter for PythonFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first { Ok(()) } else { writer.write_all(b", ") }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (pos, c) in fragment.char_indices() {
            if matches!(c, ' '..='~') {
                continue;
            }
            writer.write_all(&fragment.as_bytes()[start..pos])?;
            let mut units = [0u16; 2];
            for unit in c.encode_utf16(&mut units) {
                write!(writer, "\\u{:04x}", unit)?;
            }
            start = pos + c.len_utf8();
        }
        writer.write_all(&fragment.as_bytes()[start..])
    }
}

/// Serialize an index as `Search.setIndex(<json>)`
///
/// # Errors
///
/// Returns an error only if serialization itself fails.
pub fn write_search_index(index: &SearchIndex) -> Result<String> {
    let mut buffer = Vec::with_capacity(4096);
    buffer.extend_from_slice(SET_INDEX_CALL.as_bytes());

    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, PythonFormatter);
    index.serialize(&mut serializer).context("Failed to serialize search index")?;
    buffer.push(b')');

    String::from_utf8(buffer).context("Serialized search index is not UTF-8")
}

/// Write an index to `path` atomically (temp file + rename)
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written or renamed.
pub fn save_search_index(path: &Path, index: &SearchIndex) -> Result<()> {
    let text = write_search_index(index)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory: {}", parent.display()))?;
    }

    let file_name = path
        .file_name()
        .with_context(|| format!("Output path has no file name: {}", path.display()))?;
    let temp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    fs::write(&temp_path, text.as_bytes())
        .with_context(|| format!("Failed to write temp file: {}", temp_path.display()))?;
    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to {}", path.display()))?;

    debug!(path = %path.display(), bytes = text.len(), "Saved search index");
    Ok(())
}
