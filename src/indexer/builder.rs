//! Search index builder for documentation source trees.
//!
//! # Error Handling Strategy
//!
//! This module follows a **graceful degradation** approach suitable for CLI tools:
//!
//! - **File-level errors**: Unreadable or non-UTF-8 sources are logged as warnings and
//!   left out of the index, allowing partial builds
//! - **Failure thresholds**: The build fails if more than 50% of the discovered sources
//!   cannot be read (systematic problem such as wrong permissions or encoding)
//! - **User feedback**: A summary with document, success and failure counts is logged at
//!   the end of every build
//!
//! # Determinism
//!
//! Documents are ordered by docname before ids are assigned and every map in the
//! output is ordered, so the same sources always produce byte-identical output
//! regardless of discovery or parse order.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::indexer::discovery::discover_sources;
use crate::models::{
    EnvVersion, IndexEntryLocation, ObjName, ObjectEntry, Postings, SearchIndex, SourceDocument,
    TitleLocation,
};
use crate::parsers::parse_source_file;
use crate::query::stemmer::stem;
use crate::query::tokenizer::is_stopword;

/// Domain versions recorded in generated indexes
pub const DEFAULT_ENV_VERSIONS: &[(&str, u32)] =
    &[("sphinx", 64), ("sphinx.domains.python", 4), ("sphinx.domains.std", 2)];

/// Accumulates source documents and turns them into a [`SearchIndex`]
#[derive(Debug, Clone)]
pub struct IndexBuilder {
    documents: Vec<SourceDocument>,
    envversion: EnvVersion,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Words the index never stores
fn is_filtered(word: &str) -> bool {
    word.is_empty() || is_stopword(word)
}

fn domain_label(domain: &str) -> &str {
    match domain {
        "py" => "Python",
        "js" => "JavaScript",
        "c" => "C",
        "cpp" => "C++",
        "rst" => "reStructuredText",
        "std" => "Standard",
        other => other,
    }
}

/// One object ready to be grouped under its prefix
struct PendingObject<'a> {
    domain: &'a str,
    kind: &'a str,
    fullname: &'a str,
    prefix: &'a str,
    name: &'a str,
    doc_id: usize,
    priority: i32,
    anchor: &'a str,
}

impl IndexBuilder {
    pub fn new() -> Self {
        let versions =
            DEFAULT_ENV_VERSIONS.iter().map(|(domain, v)| (domain.to_string(), *v)).collect();
        Self { documents: Vec::new(), envversion: EnvVersion::Domains(versions) }
    }

    pub fn with_envversion(mut self, envversion: EnvVersion) -> Self {
        self.envversion = envversion;
        self
    }

    /// Add one page; a later page with the same docname replaces an earlier one
    pub fn add_document(&mut self, document: SourceDocument) {
        if let Some(existing) = self.documents.iter_mut().find(|d| d.docname == document.docname) {
            warn!("Duplicate docname {}, keeping {}", document.docname, document.filename);
            *existing = document;
        } else {
            self.documents.push(document);
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Assemble the index
    pub fn build(mut self) -> SearchIndex {
        self.documents.sort_by(|a, b| a.docname.cmp(&b.docname));

        let mut index = SearchIndex { envversion: self.envversion.clone(), ..Default::default() };
        let mut title_map: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();
        let mut term_map: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

        for (doc_id, doc) in self.documents.iter().enumerate() {
            index.docnames.push(doc.docname.clone());
            index.filenames.push(doc.filename.clone());
            index.titles.push(doc.title.clone());

            index_title_words(doc_id, &doc.title_words, &mut title_map);
            index_body_words(doc_id, &doc.words, &title_map, &mut term_map);
            add_titles(doc_id, doc, &mut index.alltitles);

            for entry in &doc.index_entries {
                index.indexentries.entry(entry.entry.clone()).or_default().push(
                    IndexEntryLocation {
                        doc_id,
                        anchor: entry.anchor.clone(),
                        is_main: entry.is_main,
                    },
                );
            }
        }

        for locations in index.indexentries.values_mut() {
            locations.sort_by(|a, b| (a.doc_id, &a.anchor).cmp(&(b.doc_id, &b.anchor)));
            locations.dedup();
        }

        index.titleterms = into_postings(title_map);
        index.terms = into_postings(term_map);
        self.add_objects(&mut index);
        index
    }

    fn add_objects(&self, index: &mut SearchIndex) {
        let mut pending: Vec<PendingObject<'_>> = Vec::new();
        let mut seen: BTreeSet<(&str, &str)> = BTreeSet::new();

        for (doc_id, doc) in self.documents.iter().enumerate() {
            for object in &doc.objects {
                if object.priority < 0 {
                    continue;
                }
                if !seen.insert((object.domain.as_str(), object.fullname.as_str())) {
                    warn!(
                        "Duplicate object description of {} in {}, ignoring it",
                        object.fullname, doc.docname
                    );
                    continue;
                }
                pending.push(PendingObject {
                    domain: &object.domain,
                    kind: &object.kind,
                    fullname: &object.fullname,
                    prefix: &object.prefix,
                    name: object.name(),
                    doc_id,
                    priority: object.priority,
                    anchor: &object.anchor,
                });
            }
        }

        pending.sort_by(|a, b| (a.domain, a.fullname, a.kind).cmp(&(b.domain, b.fullname, b.kind)));

        let mut type_ids: BTreeMap<(&str, &str), u32> = BTreeMap::new();
        for object in pending {
            let next_id = type_ids.len() as u32;
            let type_id = *type_ids.entry((object.domain, object.kind)).or_insert_with(|| {
                index.objtypes.insert(next_id.to_string(), format!("{}:{}", object.domain, object.kind));
                index.objnames.insert(
                    next_id.to_string(),
                    ObjName {
                        domain: object.domain.to_string(),
                        name: object.kind.to_string(),
                        label: format!("{} {}", domain_label(object.domain), object.kind),
                    },
                );
                next_id
            });

            index.objects.entry(object.prefix.to_string()).or_default().push(ObjectEntry {
                doc_id: object.doc_id,
                type_id,
                priority: object.priority,
                anchor: object.anchor.to_string(),
                name: object.name.to_string(),
            });
        }
    }
}

/// Title words are stemmed; a word whose stem is filtered is kept lowercased
fn index_title_words(doc_id: usize, words: &[String], title_map: &mut BTreeMap<String, BTreeSet<usize>>) {
    for word in words {
        let lower = word.to_lowercase();
        let stemmed = stem(&lower);
        if !is_filtered(&stemmed) {
            title_map.entry(stemmed).or_default().insert(doc_id);
        } else if !is_filtered(word) {
            title_map.entry(lower).or_default().insert(doc_id);
        }
    }
}

/// Body words are stemmed, unless the stem is filtered but the word itself is not
///
/// Words the same page already has as title terms are left out.
fn index_body_words(
    doc_id: usize,
    words: &[String],
    title_map: &BTreeMap<String, BTreeSet<usize>>,
    term_map: &mut BTreeMap<String, BTreeSet<usize>>,
) {
    for word in words {
        let mut key = stem(&word.to_lowercase());
        if is_filtered(&key) && !is_filtered(word) {
            key = word.clone();
        }
        if is_filtered(&key) {
            continue;
        }
        let in_title = title_map.get(&key).is_some_and(|docs| docs.contains(&doc_id));
        if !in_title {
            term_map.entry(key).or_default().insert(doc_id);
        }
    }
}

fn add_titles(doc_id: usize, doc: &SourceDocument, alltitles: &mut BTreeMap<String, Vec<TitleLocation>>) {
    alltitles
        .entry(doc.title.clone())
        .or_default()
        .push(TitleLocation { doc_id, anchor: None });
    for section in &doc.sections {
        alltitles
            .entry(section.title.clone())
            .or_default()
            .push(TitleLocation { doc_id, anchor: Some(section.anchor.clone()) });
    }
}

fn into_postings(map: BTreeMap<String, BTreeSet<usize>>) -> BTreeMap<String, Postings> {
    map.into_iter()
        .map(|(word, docs)| (word, Postings::from_ids(docs.into_iter().collect())))
        .collect()
}

/// Build an index from every source below `root`
///
/// Sources are discovered with [`discover_sources`] and parsed in parallel.
///
/// # Errors
///
/// Returns an error if:
/// - `root` is not a readable directory
/// - More than 50% of the sources fail to read (systematic problem)
///
/// Individual unreadable sources are logged as warnings and skipped.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use search_index_explorer::build_index_from_dir;
///
/// let index = build_index_from_dir(Path::new("docs"))?;
/// println!("Indexed {} documents", index.document_count());
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn build_index_from_dir(root: &Path) -> Result<SearchIndex> {
    let sources = discover_sources(root)?;

    let parsed: Vec<(&PathBuf, Result<SourceDocument>)> =
        sources.par_iter().map(|path| (path, parse_source_file(root, path))).collect();

    let mut builder = IndexBuilder::new();
    let mut failed = 0usize;
    for (path, result) in parsed {
        match result {
            Ok(document) => builder.add_document(document),
            Err(e) => {
                failed += 1;
                warn!("Failed to read source {}: {:#}", path.display(), e);
            }
        }
    }

    let total = sources.len();
    if total > 0 {
        let failure_rate = failed as f64 / total as f64;
        if failure_rate > 0.5 {
            bail!(
                "Index building failed: {}/{} sources could not be read ({}% failure rate)",
                failed,
                total,
                (failure_rate * 100.0) as u32
            );
        }
    }

    info!("Indexed {} documents ({} sources read, {} failed)", builder.len(), total - failed, failed);
    Ok(builder.build())
}
