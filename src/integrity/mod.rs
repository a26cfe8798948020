//! Referential integrity checks for a loaded search index.
//!
//! The index is a set of parallel arrays and maps keyed by positional document
//! ids and numeric type codes. Nothing in the file format enforces that those
//! references line up, so a hand-edited or truncated artifact can silently
//! break the search page. [`validate`] walks every reference and reports what
//! is wrong.
//!
//! # Severity
//!
//! - **Errors** break lookups: parallel arrays of different lengths, doc ids
//!   past the end of `docnames`, objects using undefined type ids.
//! - **Warnings** are harmless leftovers: type codes nothing uses, or `objtypes`
//!   and `objnames` disagreeing on a type's `domain:name`.
//!
//! All issues are collected; validation never stops at the first one.

use std::collections::BTreeSet;
use std::fmt;

use thiserror::Error;
use tracing::debug;

use crate::models::{Postings, SearchIndex};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// A single integrity finding
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IndexIssue {
    #[error("parallel arrays differ in length: docnames={docnames}, filenames={filenames}, titles={titles}")]
    LengthMismatch { docnames: usize, filenames: usize, titles: usize },

    #[error("{section} entry `{key}` references document {doc_id}, but only {count} documents exist")]
    DanglingDocument { section: &'static str, key: String, doc_id: usize, count: usize },

    #[error("object `{fullname}` uses type {type_id}, which has no {missing} entry")]
    UnknownObjectType { fullname: String, type_id: u32, missing: &'static str },

    #[error("type {type_id} is listed in {present} but missing from {missing}")]
    UnpairedType { type_id: String, present: &'static str, missing: &'static str },

    #[error("type {type_id} is `{objtype}` in objtypes but `{objname}` in objnames")]
    TypeLabelMismatch { type_id: String, objtype: String, objname: String },

    #[error("type {type_id} (`{objtype}`) is never used by any object")]
    OrphanedType { type_id: String, objtype: String },
}

impl IndexIssue {
    pub fn severity(&self) -> Severity {
        match self {
            IndexIssue::LengthMismatch { .. }
            | IndexIssue::DanglingDocument { .. }
            | IndexIssue::UnknownObjectType { .. } => Severity::Error,
            IndexIssue::UnpairedType { .. }
            | IndexIssue::TypeLabelMismatch { .. }
            | IndexIssue::OrphanedType { .. } => Severity::Warning,
        }
    }
}

/// Every issue found in one index
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    pub issues: Vec<IndexIssue>,
}

impl ValidationReport {
    /// No errors; warnings are allowed
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &IndexIssue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IndexIssue> {
        self.issues.iter().filter(|i| i.severity() == Severity::Warning)
    }
}

/// Check every cross-reference in `index`
pub fn validate(index: &SearchIndex) -> ValidationReport {
    let mut issues = Vec::new();

    check_lengths(index, &mut issues);
    check_documents(index, &mut issues);
    check_object_types(index, &mut issues);
    check_type_tables(index, &mut issues);

    let report = ValidationReport { issues };
    debug!(
        errors = report.errors().count(),
        warnings = report.warnings().count(),
        "Validated search index"
    );
    report
}

fn check_lengths(index: &SearchIndex, issues: &mut Vec<IndexIssue>) {
    let (docnames, filenames, titles) =
        (index.docnames.len(), index.filenames.len(), index.titles.len());
    if docnames != filenames || docnames != titles {
        issues.push(IndexIssue::LengthMismatch { docnames, filenames, titles });
    }
}

fn check_documents(index: &SearchIndex, issues: &mut Vec<IndexIssue>) {
    let count = index.docnames.len();
    let mut dangling = |section: &'static str, key: &str, doc_id: usize| {
        if doc_id >= count {
            issues.push(IndexIssue::DanglingDocument {
                section,
                key: key.to_string(),
                doc_id,
                count,
            });
        }
    };

    let postings_sections: [(&'static str, &std::collections::BTreeMap<String, Postings>); 2] =
        [("terms", &index.terms), ("titleterms", &index.titleterms)];
    for (section, map) in postings_sections {
        for (key, postings) in map {
            for &doc_id in postings.ids() {
                dangling(section, key, doc_id);
            }
        }
    }

    for (prefix, entries) in &index.objects {
        for entry in entries {
            dangling("objects", &entry.fullname(prefix), entry.doc_id);
        }
    }
    for (title, locations) in &index.alltitles {
        for location in locations {
            dangling("alltitles", title, location.doc_id);
        }
    }
    for (entry, locations) in &index.indexentries {
        for location in locations {
            dangling("indexentries", entry, location.doc_id);
        }
    }
}

fn check_object_types(index: &SearchIndex, issues: &mut Vec<IndexIssue>) {
    for (prefix, entry) in index.iter_objects() {
        if index.objname(entry.type_id).is_none() {
            issues.push(IndexIssue::UnknownObjectType {
                fullname: entry.fullname(prefix),
                type_id: entry.type_id,
                missing: "objnames",
            });
        }
        if index.objtype(entry.type_id).is_none() {
            issues.push(IndexIssue::UnknownObjectType {
                fullname: entry.fullname(prefix),
                type_id: entry.type_id,
                missing: "objtypes",
            });
        }
    }
}

fn check_type_tables(index: &SearchIndex, issues: &mut Vec<IndexIssue>) {
    for (type_id, objtype) in &index.objtypes {
        match index.objnames.get(type_id) {
            None => issues.push(IndexIssue::UnpairedType {
                type_id: type_id.clone(),
                present: "objtypes",
                missing: "objnames",
            }),
            Some(objname) => {
                let tag = format!("{}:{}", objname.domain, objname.name);
                if &tag != objtype {
                    issues.push(IndexIssue::TypeLabelMismatch {
                        type_id: type_id.clone(),
                        objtype: objtype.clone(),
                        objname: tag,
                    });
                }
            }
        }
    }
    for type_id in index.objnames.keys() {
        if !index.objtypes.contains_key(type_id) {
            issues.push(IndexIssue::UnpairedType {
                type_id: type_id.clone(),
                present: "objnames",
                missing: "objtypes",
            });
        }
    }

    let used: BTreeSet<String> = index.iter_objects().map(|(_, e)| e.type_id.to_string()).collect();
    for (type_id, objtype) in &index.objtypes {
        if !used.contains(type_id) {
            issues.push(IndexIssue::OrphanedType {
                type_id: type_id.clone(),
                objtype: objtype.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IndexEntryLocation, ObjName, ObjectEntry, TitleLocation};

    fn consistent_index() -> SearchIndex {
        let mut index = SearchIndex {
            docnames: vec!["index".into(), "api".into()],
            filenames: vec!["index.rst".into(), "api.rst".into()],
            titles: vec!["Home".into(), "API".into()],
            ..Default::default()
        };
        index.terms.insert("home".into(), Postings::Single(0));
        index.titleterms.insert("api".into(), Postings::Single(1));
        index.alltitles.insert("Home".into(), vec![TitleLocation { doc_id: 0, anchor: None }]);
        index.objnames.insert("0".into(), ObjName::from(("py".into(), "module".into(), "Python module".into())));
        index.objtypes.insert("0".into(), "py:module".into());
        index.objects.insert("".into(), vec![ObjectEntry::from((1, 0, 0, "-".into(), "pkg".into()))]);
        index
    }

    #[test]
    fn test_consistent_index_has_no_issues() {
        let report = validate(&consistent_index());
        assert!(report.is_valid());
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_empty_index_is_valid() {
        assert!(validate(&SearchIndex::default()).is_valid());
    }

    #[test]
    fn test_length_mismatch_is_error() {
        let mut index = consistent_index();
        index.titles.pop();
        let report = validate(&index);
        assert!(!report.is_valid());
        assert!(matches!(
            report.issues[0],
            IndexIssue::LengthMismatch { docnames: 2, filenames: 2, titles: 1 }
        ));
    }

    #[test]
    fn test_dangling_references_in_every_section() {
        let mut index = consistent_index();
        index.terms.insert("ghost".into(), Postings::Many(vec![0, 9]));
        index.titleterms.insert("ghost".into(), Postings::Single(5));
        index.alltitles.insert("Ghost".into(), vec![TitleLocation { doc_id: 3, anchor: None }]);
        index.indexentries.insert(
            "ghost".into(),
            vec![IndexEntryLocation { doc_id: 4, anchor: "g".into(), is_main: true }],
        );
        index.objects.insert("pkg".into(), vec![ObjectEntry::from((7, 0, 1, "".into(), "f".into()))]);

        let report = validate(&index);
        let sections: BTreeSet<&str> = report
            .issues
            .iter()
            .filter_map(|issue| match issue {
                IndexIssue::DanglingDocument { section, .. } => Some(*section),
                _ => None,
            })
            .collect();
        assert_eq!(
            sections,
            BTreeSet::from(["alltitles", "indexentries", "objects", "terms", "titleterms"])
        );
        assert_eq!(report.errors().count(), 5);
    }

    #[test]
    fn test_unknown_object_type() {
        let mut index = consistent_index();
        index.objects.insert("pkg".into(), vec![ObjectEntry::from((0, 4, 1, "".into(), "f".into()))]);
        let report = validate(&index);
        assert!(!report.is_valid());
        assert_eq!(
            report
                .errors()
                .filter(|i| matches!(i, IndexIssue::UnknownObjectType { type_id: 4, .. }))
                .count(),
            2
        );
    }

    #[test]
    fn test_orphaned_type_is_warning() {
        let mut index = consistent_index();
        index.objnames.insert("1".into(), ObjName::from(("py".into(), "function".into(), "Python function".into())));
        index.objtypes.insert("1".into(), "py:function".into());
        let report = validate(&index);
        assert!(report.is_valid());
        let warnings: Vec<_> = report.warnings().collect();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].to_string().contains("py:function"));
    }

    #[test]
    fn test_type_table_mismatches_are_warnings() {
        let mut index = consistent_index();
        index.objtypes.insert("0".into(), "py:package".into());
        index.objnames.insert("2".into(), ObjName::from(("py".into(), "class".into(), "Python class".into())));
        let report = validate(&index);
        assert!(report.is_valid());
        assert!(report.issues.iter().any(|i| matches!(i, IndexIssue::TypeLabelMismatch { .. })));
        assert!(report.issues.iter().any(|i| matches!(
            i,
            IndexIssue::UnpairedType { present: "objnames", missing: "objtypes", .. }
        )));
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Error > Severity::Warning);
        assert_eq!(Severity::Error.to_string(), "error");
    }
}
