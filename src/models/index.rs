use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One or more document ids for a term
///
/// The generator writes a bare integer when a term occurs in exactly one
/// document and an array otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Postings {
    Single(usize),
    Many(Vec<usize>),
}

impl Postings {
    /// Build postings from a sorted, deduplicated id list
    pub fn from_ids(mut ids: Vec<usize>) -> Self {
        ids.sort_unstable();
        ids.dedup();
        if ids.len() == 1 { Postings::Single(ids[0]) } else { Postings::Many(ids) }
    }

    pub fn ids(&self) -> &[usize] {
        match self {
            Postings::Single(id) => std::slice::from_ref(id),
            Postings::Many(ids) => ids,
        }
    }

    pub fn contains(&self, doc_id: usize) -> bool {
        self.ids().contains(&doc_id)
    }
}

/// `[doc-id, anchor]` location of a section title; a `null` anchor is the page title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, Option<String>)", into = "(usize, Option<String>)")]
pub struct TitleLocation {
    pub doc_id: usize,
    pub anchor: Option<String>,
}

impl From<(usize, Option<String>)> for TitleLocation {
    fn from((doc_id, anchor): (usize, Option<String>)) -> Self {
        Self { doc_id, anchor }
    }
}

impl From<TitleLocation> for (usize, Option<String>) {
    fn from(loc: TitleLocation) -> Self {
        (loc.doc_id, loc.anchor)
    }
}

/// `[doc-id, anchor, is_main]` location of an explicit index entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(usize, String, bool)", into = "(usize, String, bool)")]
pub struct IndexEntryLocation {
    pub doc_id: usize,
    pub anchor: String,
    pub is_main: bool,
}

impl From<(usize, String, bool)> for IndexEntryLocation {
    fn from((doc_id, anchor, is_main): (usize, String, bool)) -> Self {
        Self { doc_id, anchor, is_main }
    }
}

impl From<IndexEntryLocation> for (usize, String, bool) {
    fn from(loc: IndexEntryLocation) -> Self {
        (loc.doc_id, loc.anchor, loc.is_main)
    }
}

/// Anchor shorthand meaning "the full name"
pub const ANCHOR_FULLNAME: &str = "";
/// Anchor shorthand meaning "`<objname>-<fullname>`"
pub const ANCHOR_TYPED: &str = "-";

/// `[doc-id, type-id, priority, anchor, name]` entry under an `objects` prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(usize, u32, i32, String, String)",
    into = "(usize, u32, i32, String, String)"
)]
pub struct ObjectEntry {
    pub doc_id: usize,
    pub type_id: u32,
    pub priority: i32,
    pub anchor: String,
    pub name: String,
}

impl From<(usize, u32, i32, String, String)> for ObjectEntry {
    fn from((doc_id, type_id, priority, anchor, name): (usize, u32, i32, String, String)) -> Self {
        Self { doc_id, type_id, priority, anchor, name }
    }
}

impl From<ObjectEntry> for (usize, u32, i32, String, String) {
    fn from(e: ObjectEntry) -> Self {
        (e.doc_id, e.type_id, e.priority, e.anchor, e.name)
    }
}

impl ObjectEntry {
    /// Join the prefix it is stored under with its name
    pub fn fullname(&self, prefix: &str) -> String {
        if prefix.is_empty() { self.name.clone() } else { format!("{}.{}", prefix, self.name) }
    }
}

/// `[domain, name, label]`, e.g. `["py", "method", "Python method"]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, String, String)", into = "(String, String, String)")]
pub struct ObjName {
    pub domain: String,
    pub name: String,
    pub label: String,
}

impl From<(String, String, String)> for ObjName {
    fn from((domain, name, label): (String, String, String)) -> Self {
        Self { domain, name, label }
    }
}

impl From<ObjName> for (String, String, String) {
    fn from(n: ObjName) -> Self {
        (n.domain, n.name, n.label)
    }
}

/// Generator environment version: a bare integer in old builds, a per-domain map in newer ones
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnvVersion {
    Legacy(u32),
    Domains(BTreeMap<String, u32>),
}

impl Default for EnvVersion {
    fn default() -> Self {
        EnvVersion::Domains(BTreeMap::new())
    }
}

/// The whole `Search.setIndex(...)` payload
///
/// Field order matches the generator's sorted key order so serialization
/// reproduces it byte for byte.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchIndex {
    #[serde(default)]
    pub alltitles: BTreeMap<String, Vec<TitleLocation>>,
    pub docnames: Vec<String>,
    #[serde(default)]
    pub envversion: EnvVersion,
    pub filenames: Vec<String>,
    #[serde(default)]
    pub indexentries: BTreeMap<String, Vec<IndexEntryLocation>>,
    #[serde(default)]
    pub objects: BTreeMap<String, Vec<ObjectEntry>>,
    #[serde(default)]
    pub objnames: BTreeMap<String, ObjName>,
    #[serde(default)]
    pub objtypes: BTreeMap<String, String>,
    pub terms: BTreeMap<String, Postings>,
    pub titles: Vec<String>,
    #[serde(default)]
    pub titleterms: BTreeMap<String, Postings>,
}

impl SearchIndex {
    pub fn document_count(&self) -> usize {
        self.docnames.len()
    }

    pub fn object_count(&self) -> usize {
        self.objects.values().map(Vec::len).sum()
    }

    /// `(docname, filename, title)` for a document id, if in range of all three arrays
    pub fn document(&self, doc_id: usize) -> Option<(&str, &str, &str)> {
        Some((
            self.docnames.get(doc_id)?.as_str(),
            self.filenames.get(doc_id)?.as_str(),
            self.titles.get(doc_id)?.as_str(),
        ))
    }

    pub fn objname(&self, type_id: u32) -> Option<&ObjName> {
        self.objnames.get(&type_id.to_string())
    }

    pub fn objtype(&self, type_id: u32) -> Option<&str> {
        self.objtypes.get(&type_id.to_string()).map(String::as_str)
    }

    /// Iterate `(prefix, entry)` over every indexed object
    pub fn iter_objects(&self) -> impl Iterator<Item = (&str, &ObjectEntry)> {
        self.objects
            .iter()
            .flat_map(|(prefix, entries)| entries.iter().map(move |e| (prefix.as_str(), e)))
    }

    /// Expand the anchor shorthands into the real fragment id
    pub fn resolve_anchor(&self, prefix: &str, entry: &ObjectEntry) -> String {
        let fullname = entry.fullname(prefix);
        match entry.anchor.as_str() {
            ANCHOR_FULLNAME => fullname,
            ANCHOR_TYPED => {
                let kind = self.objname(entry.type_id).map(|n| n.name.as_str()).unwrap_or("object");
                format!("{}-{}", kind, fullname)
            }
            other => other.to_string(),
        }
    }
}
