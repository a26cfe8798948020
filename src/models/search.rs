use serde::{Deserialize, Serialize};

use crate::utils::paths::document_url;

/// Which part of the index produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Index,
    Object,
    Text,
    Title,
}

impl ResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultKind::Index => "index",
            ResultKind::Object => "object",
            ResultKind::Text => "text",
            ResultKind::Title => "title",
        }
    }
}

/// A single ranked hit, resolved to display strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub docname: String,
    pub title: String,
    /// `#fragment` or empty for the page itself
    pub anchor: String,
    pub description: Option<String>,
    pub score: i32,
    pub filename: String,
    pub kind: ResultKind,
}

impl SearchResult {
    /// Relative link to the built HTML page
    pub fn url(&self) -> String {
        document_url(&self.docname, &self.anchor)
    }
}
