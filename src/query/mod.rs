//! Querying a loaded search index.
//!
//! Mirrors the documentation site's in-browser search: the same tokenizer,
//! stopword list, Porter stemmer and scoring weights, so a query ranks the same
//! here as it does on the published pages. Exact object lookup by dotted path
//! is provided alongside.

pub mod ast;
pub mod engine;
pub mod lookup;
pub mod parser;
pub mod scorer;
pub mod stemmer;
pub mod tokenizer;

pub use ast::ParsedQuery;
pub use engine::Searcher;
pub use lookup::{ObjectMatch, QueryError, lookup_object, resolve_object};
pub use parser::parse_query;
pub use scorer::Scorer;
pub use stemmer::stem;
pub use tokenizer::{STOPWORDS, is_stopword, split_query};
