//! Builder-side inputs: what a documentation source contributes to the index.

/// A titled section inside a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub title: String,
    pub anchor: String,
}

/// A documented code symbol declared in a source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDefinition {
    /// Dotted full name, e.g. `pkg.mod.Class.method`
    pub fullname: String,
    /// Dotted namespace the object is stored under: everything before the last dot
    pub prefix: String,
    pub domain: String,
    /// `function`, `class`, `method`, ...
    pub kind: String,
    pub priority: i32,
    /// Raw anchor as stored in the index (`""`, `"-"` or explicit)
    pub anchor: String,
}

impl ObjectDefinition {
    /// Name relative to `prefix`
    pub fn name(&self) -> &str {
        if self.prefix.is_empty() {
            &self.fullname
        } else {
            self.fullname
                .strip_prefix(self.prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
                .unwrap_or(&self.fullname)
        }
    }
}

/// An explicit `.. index::` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntryDefinition {
    pub entry: String,
    pub anchor: String,
    pub is_main: bool,
}

/// Everything one page contributes to a search index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceDocument {
    pub docname: String,
    pub filename: String,
    pub title: String,
    pub sections: Vec<Section>,
    /// Body words in document order, unstemmed
    pub words: Vec<String>,
    /// Words of the page title and section titles, unstemmed
    pub title_words: Vec<String>,
    pub objects: Vec<ObjectDefinition>,
    pub index_entries: Vec<IndexEntryDefinition>,
}
