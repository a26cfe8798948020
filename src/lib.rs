//! Search Index Explorer - query, validate and generate documentation search indexes
//!
//! Documentation generators ship a static `searchindex.js` next to the HTML so the
//! browser can search without a server. This library works with that artifact
//! outside the browser:
//!
//! - Loading `Search.setIndex({...})` files into typed structures
//! - Ranking results for a query the same way the search page does
//! - Resolving dotted object names to their page and anchor
//! - Checking the index's cross-references for corruption
//! - Building an index from reStructuredText/Markdown sources and writing it back
//!   in the generator's exact byte format
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use search_index_explorer::{Searcher, load_search_index};
//!
//! let index = load_search_index(Path::new("docs/_build/html/searchindex.js"))?;
//! for result in Searcher::new(&index).search("export csv").iter().take(5) {
//!     println!("{} -> {}", result.title, result.url());
//! }
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod cli;
pub mod clipboard;
pub mod indexer;
pub mod integrity;
pub mod models;
pub mod parsers;
pub mod query;
pub mod tui;
pub mod utils;

// Re-export commonly used types
pub use indexer::{IndexBuilder, build_index_from_dir, save_search_index, write_search_index};
pub use integrity::{IndexIssue, ValidationReport, validate};
pub use models::{ResultKind, SearchIndex, SearchResult};
pub use parsers::{load_search_index, parse_search_index};
pub use query::{ObjectMatch, QueryError, Searcher, lookup_object, parse_query, resolve_object};
pub use utils::paths::format_path_with_tilde;
