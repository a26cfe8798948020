//! Free-text query parser.
//!
//! Turns what a reader types into the term sets the search engine works on.
//!
//! # Syntax
//!
//! ```text
//! query := word (whitespace word)*
//! word  := "-"? text
//! ```
//!
//! Each word is split into pieces of letters, digits and `_`. Pieces are lowercased
//! and stemmed. Stopwords and purely numeric pieces never become search terms, but
//! every piece still takes part in object-name matching.
//!
//! # Examples
//!
//! ```rust
//! # use search_index_explorer::query::parse_query;
//! let query = parse_query("exporting logs -sqlite");
//! assert!(query.search_terms.contains("export"));
//! assert!(query.search_terms.contains("log"));
//! assert!(query.excluded_terms.contains("sqlite"));
//! ```

use super::ast::ParsedQuery;
use super::stemmer::stem;
use super::tokenizer::{is_numeric, is_stopword, split_query};

/// Parse a free-text query
///
/// Never fails: an empty or all-stopword query produces an empty term set and
/// the engine returns no text results for it.
pub fn parse_query(text: &str) -> ParsedQuery {
    let mut parsed = ParsedQuery { raw: text.to_string(), ..Default::default() };

    for piece in split_query(text) {
        let lower = piece.to_lowercase();
        if !parsed.object_terms.contains(&lower) {
            parsed.object_terms.push(lower);
        }
    }

    for word in text.split_whitespace() {
        let (excluded, body) = match word.strip_prefix('-') {
            Some(rest) if !rest.is_empty() => (true, rest),
            _ => (false, word),
        };

        for piece in split_query(body) {
            let lower = piece.to_lowercase();
            if lower.is_empty() || is_stopword(&lower) || is_numeric(&lower) {
                continue;
            }

            let stemmed = stem(&lower);
            if excluded {
                parsed.excluded_terms.insert(stemmed);
            } else {
                parsed.search_terms.insert(stemmed);
                parsed.highlight_terms.insert(lower);
            }
        }
    }

    parsed
}
