use thiserror::Error;

use crate::models::{ObjectEntry, SearchIndex};
use crate::utils::paths::document_url;

/// Failure to pin a dotted path to a single documented object
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("no object named `{0}` in the index")]
    NotFound(String),
    #[error("`{path}` is ambiguous: {count} objects match")]
    Ambiguous { path: String, count: usize },
}

/// An object found by exact dotted-path lookup, with its display data resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMatch {
    pub fullname: String,
    pub prefix: String,
    pub entry: ObjectEntry,
    /// `domain:name` tag, e.g. `py:method`
    pub objtype: String,
    /// Readable label, e.g. `Python method`
    pub label: String,
    pub docname: String,
    pub filename: String,
    pub title: String,
    /// `#fragment` on the page
    pub anchor: String,
}

impl ObjectMatch {
    pub fn url(&self) -> String {
        document_url(&self.docname, &self.anchor)
    }
}

/// Every `(prefix, name)` split of a dotted path, longest prefix first
///
/// `a.b.c` yields `("a.b", "c")`, `("a", "b.c")` and `("", "a.b.c")`.
fn candidate_splits(path: &str) -> Vec<(&str, &str)> {
    let mut splits: Vec<(&str, &str)> =
        path.rmatch_indices('.').map(|(pos, _)| (&path[..pos], &path[pos + 1..])).collect();
    splits.push(("", path));
    splits
}

/// Find every object whose full name is exactly `path`
///
/// Current builds store `pkg.mod.Class.method` under prefix `pkg.mod.Class`, older
/// ones under the module (`pkg.mod`, name `Class.method`). Every split is tried.
pub fn lookup_object(index: &SearchIndex, path: &str) -> Vec<ObjectMatch> {
    let path = path.trim();
    if path.is_empty() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    for (prefix, name) in candidate_splits(path) {
        if name.is_empty() {
            continue;
        }
        let Some(entries) = index.objects.get(prefix) else {
            continue;
        };
        for entry in entries.iter().filter(|e| e.name == name) {
            let Some((docname, filename, title)) = index.document(entry.doc_id) else {
                continue;
            };
            matches.push(ObjectMatch {
                fullname: entry.fullname(prefix),
                prefix: prefix.to_string(),
                entry: entry.clone(),
                objtype: index.objtype(entry.type_id).unwrap_or_default().to_string(),
                label: index.objname(entry.type_id).map(|n| n.label.clone()).unwrap_or_default(),
                docname: docname.to_string(),
                filename: filename.to_string(),
                title: title.to_string(),
                anchor: format!("#{}", index.resolve_anchor(prefix, entry)),
            });
        }
    }
    matches
}

/// Look up a dotted path that must name exactly one object
///
/// # Errors
///
/// [`QueryError::NotFound`] when nothing matches, [`QueryError::Ambiguous`] when
/// several entries do.
pub fn resolve_object(index: &SearchIndex, path: &str) -> Result<ObjectMatch, QueryError> {
    let mut matches = lookup_object(index, path);
    match matches.len() {
        0 => Err(QueryError::NotFound(path.trim().to_string())),
        1 => Ok(matches.remove(0)),
        count => Err(QueryError::Ambiguous { path: path.trim().to_string(), count }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ObjName;

    fn index_with_method() -> SearchIndex {
        let mut index = SearchIndex {
            docnames: vec!["api".into()],
            filenames: vec!["api.rst".into()],
            titles: vec!["API Reference".into()],
            ..Default::default()
        };
        index.objnames.insert("0".into(), ObjName::from(("py".into(), "module".into(), "Python module".into())));
        index.objnames.insert("5".into(), ObjName::from(("py".into(), "method".into(), "Python method".into())));
        index.objtypes.insert("0".into(), "py:module".into());
        index.objtypes.insert("5".into(), "py:method".into());
        index.objects.insert("".into(), vec![ObjectEntry::from((0, 0, 0, "-".into(), "pkg.mod".into()))]);
        index.objects.insert(
            "pkg.mod".into(),
            vec![ObjectEntry::from((0, 5, 1, "".into(), "Paths.get".into()))],
        );
        index
    }

    #[test]
    fn test_candidate_splits() {
        assert_eq!(candidate_splits("a.b.c"), vec![("a.b", "c"), ("a", "b.c"), ("", "a.b.c")]);
        assert_eq!(candidate_splits("a"), vec![("", "a")]);
    }

    #[test]
    fn test_lookup_method_under_module_prefix() {
        let index = index_with_method();
        let matches = lookup_object(&index, "pkg.mod.Paths.get");
        assert_eq!(matches.len(), 1);
        let found = &matches[0];
        assert_eq!(found.prefix, "pkg.mod");
        assert_eq!(found.objtype, "py:method");
        assert_eq!(found.label, "Python method");
        assert_eq!(found.anchor, "#pkg.mod.Paths.get");
        assert_eq!(found.url(), "api.html#pkg.mod.Paths.get");
    }

    #[test]
    fn test_lookup_module_with_empty_prefix() {
        let index = index_with_method();
        let found = resolve_object(&index, "pkg.mod").unwrap();
        assert_eq!(found.anchor, "#module-pkg.mod");
        assert_eq!(found.objtype, "py:module");
    }

    #[test]
    fn test_lookup_is_exact() {
        let index = index_with_method();
        assert!(lookup_object(&index, "pkg.mod.Paths").is_empty());
        assert!(lookup_object(&index, "pkg.mod.").is_empty());
        assert!(lookup_object(&index, "").is_empty());
    }

    #[test]
    fn test_resolve_not_found() {
        let index = index_with_method();
        let err = resolve_object(&index, "pkg.missing").unwrap_err();
        assert_eq!(err, QueryError::NotFound("pkg.missing".into()));
        assert!(err.to_string().contains("pkg.missing"));
    }

    #[test]
    fn test_resolve_ambiguous() {
        let mut index = index_with_method();
        index.objects.insert(
            "pkg".into(),
            vec![ObjectEntry::from((0, 5, 1, "".into(), "mod.Paths.get".into()))],
        );
        let err = resolve_object(&index, "pkg.mod.Paths.get").unwrap_err();
        assert_eq!(err, QueryError::Ambiguous { path: "pkg.mod.Paths.get".into(), count: 2 });
    }
}
