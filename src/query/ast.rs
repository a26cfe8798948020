use std::collections::BTreeSet;

/// A free-text query broken down the way the search client does it
///
/// - `search_terms`: stemmed words every text result must contain
/// - `excluded_terms`: stemmed words no text result may contain
/// - `highlight_terms`: lowercased, unstemmed words for highlighting
/// - `object_terms`: lowercased pieces matched against object names, in query order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub raw: String,
    pub search_terms: BTreeSet<String>,
    pub excluded_terms: BTreeSet<String>,
    pub highlight_terms: BTreeSet<String>,
    pub object_terms: Vec<String>,
}

impl ParsedQuery {
    pub fn is_empty(&self) -> bool {
        self.search_terms.is_empty() && self.object_terms.is_empty()
    }

    /// The trimmed, lowercased query used for title and index-entry matching
    pub fn normalized(&self) -> String {
        self.raw.trim().to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parsed_query_empty() {
        let query = ParsedQuery::default();
        assert!(query.is_empty());
        assert_eq!(query.normalized(), "");
    }

    #[test]
    fn test_normalized_trims_and_lowercases() {
        let query = ParsedQuery { raw: "  Getting Started ".to_string(), ..Default::default() };
        assert_eq!(query.normalized(), "getting started");
    }
}
