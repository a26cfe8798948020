//! Search index generation from documentation sources
//!
//! # Error Handling Strategy
//!
//! The indexer combines graceful degradation with error rate tracking:
//!
//! - **Source-level failures**: A source that cannot be read is logged and left out.
//!   The rest of the tree is still indexed.
//!
//! - **Error rate tracking**: Tracks successful vs failed source reads. Returns an error
//!   if >50% of sources fail, preventing a near-empty index from replacing a good one.
//!
//! - **Output safety**: Indexes are written to a temp file and renamed into place, so a
//!   failed write never leaves a truncated `searchindex.js` behind.

pub mod builder;
pub mod discovery;
pub mod writer;

pub use builder::{IndexBuilder, build_index_from_dir};
pub use discovery::discover_sources;
pub use writer::{PythonFormatter, save_search_index, write_search_index};
