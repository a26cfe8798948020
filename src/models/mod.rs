//! Data models for documentation search indexes.
//!
//! - [`SearchIndex`] - The `Search.setIndex(...)` payload and its parts
//! - [`SearchResult`] - A ranked hit returned by the query engine
//! - [`SourceDocument`] - What one documentation page contributes when building an index
//!
//! The index types serialize to the generator's tuple/array layout via serde
//! `from`/`into` conversions, so named fields are used everywhere in Rust code.

pub mod document;
pub mod index;
pub mod search;

pub use document::{IndexEntryDefinition, ObjectDefinition, Section, SourceDocument};
pub use index::{
    EnvVersion, IndexEntryLocation, ObjName, ObjectEntry, Postings, SearchIndex, TitleLocation,
};
pub use search::{ResultKind, SearchResult};
