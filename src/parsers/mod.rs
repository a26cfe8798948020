//! Parsers for search index artifacts and documentation sources
//!
//! # Error Handling Strategy
//!
//! - **Index artifacts** (`searchindex.js`) are all-or-nothing: a payload that does not
//!   deserialize into a complete index is an error carrying the file path as context.
//!   Partial indexes are never returned, since positional doc ids make a truncated
//!   index actively misleading.
//!
//! - **Source pages** never fail once read: unknown directives and markup are treated
//!   as body text. Only IO, size limit and UTF-8 errors surface, and the indexer
//!   decides whether to skip the page or abort the build.
//!
//! - **Error propagation**: Uses `anyhow::Result` with context. Callers report errors,
//!   they do not match on them.

pub mod rst;
pub mod searchindex;

pub use rst::{parse_source, parse_source_file};
pub use searchindex::{load_search_index, parse_search_index};
