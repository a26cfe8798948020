//! Ranked search over a loaded index.
//!
//! Reproduces the ranking of the browser-side search client so results from
//! the command line agree with what readers see on the published site.
//!
//! # Result Sources
//!
//! A query is matched against four parts of the index, in this order:
//!
//! 1. Section and page titles (`alltitles`)
//! 2. Explicit index entries (`indexentries`)
//! 3. Documented objects (`objects`), once per query piece
//! 4. The stemmed body and title word lists (`terms`, `titleterms`)
//!
//! Duplicates are collapsed keeping the best score, then everything is ordered by
//! score (descending) and title (ascending, case-insensitive). Index entries that
//! are not the main entry for their topic always come last.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use super::ast::ParsedQuery;
use super::parser::parse_query;
use super::scorer::Scorer;
use crate::models::{Postings, ResultKind, SearchIndex, SearchResult};

/// Search engine borrowing an immutable index
pub struct Searcher<'a> {
    index: &'a SearchIndex,
    scorer: Scorer,
}

impl<'a> Searcher<'a> {
    pub fn new(index: &'a SearchIndex) -> Self {
        Self { index, scorer: Scorer::default() }
    }

    pub fn with_scorer(index: &'a SearchIndex, scorer: Scorer) -> Self {
        Self { index, scorer }
    }

    pub fn index(&self) -> &'a SearchIndex {
        self.index
    }

    /// Run a free-text query and return ranked results
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let parsed = parse_query(query);
        self.search_parsed(&parsed)
    }

    /// Run an already parsed query
    pub fn search_parsed(&self, query: &ParsedQuery) -> Vec<SearchResult> {
        let query_lower = query.normalized();
        if query_lower.is_empty() {
            return Vec::new();
        }

        let mut normal = self.title_results(&query_lower);
        let (main_entries, other_entries) = self.index_entry_results(&query_lower);
        normal.extend(main_entries);

        for term in &query.object_terms {
            normal.extend(self.object_results(term, &query.object_terms));
        }
        normal.extend(self.term_results(query));

        let mut results = dedupe(normal);
        results.sort_by(compare_results);

        // Non-main entries go after everything else, minus anything already shown
        let mut seen: HashSet<ResultKey> = results.iter().map(ResultKey::of).collect();
        let mut others = dedupe(other_entries);
        others.sort_by(compare_results);
        for result in others {
            if seen.insert(ResultKey::of(&result)) {
                results.push(result);
            }
        }

        debug!(query = %query.raw, results = results.len(), "Search finished");
        results
    }

    fn title_results(&self, query_lower: &str) -> Vec<SearchResult> {
        let query_len = query_lower.chars().count();
        let mut results = Vec::new();

        for (title, locations) in &self.index.alltitles {
            let title_len = title.chars().count();
            if !title.to_lowercase().trim().contains(query_lower) || query_len * 2 < title_len {
                continue;
            }

            let score = ratio_score(self.scorer.title, query_len, title_len);
            for location in locations {
                let Some((docname, filename, page_title)) = self.index.document(location.doc_id)
                else {
                    continue;
                };
                let is_page_title = page_title == title;
                let display = if is_page_title {
                    title.clone()
                } else {
                    format!("{} > {}", page_title, title)
                };
                results.push(SearchResult {
                    docname: docname.to_string(),
                    title: display,
                    anchor: location.anchor.as_deref().map(fragment).unwrap_or_default(),
                    description: None,
                    score: score + i32::from(is_page_title),
                    filename: filename.to_string(),
                    kind: ResultKind::Title,
                });
            }
        }

        results
    }

    /// `(main, non-main)` index entry hits
    fn index_entry_results(&self, query_lower: &str) -> (Vec<SearchResult>, Vec<SearchResult>) {
        let query_len = query_lower.chars().count();
        let mut main = Vec::new();
        let mut other = Vec::new();

        for (entry, locations) in &self.index.indexentries {
            let entry_len = entry.chars().count();
            if !entry.to_lowercase().contains(query_lower) || query_len * 2 < entry_len {
                continue;
            }

            let score = ratio_score(100, query_len, entry_len);
            for location in locations {
                let Some((docname, filename, page_title)) = self.index.document(location.doc_id)
                else {
                    continue;
                };
                let result = SearchResult {
                    docname: docname.to_string(),
                    title: page_title.to_string(),
                    anchor: if location.anchor.is_empty() {
                        String::new()
                    } else {
                        fragment(&location.anchor)
                    },
                    description: None,
                    score,
                    filename: filename.to_string(),
                    kind: ResultKind::Index,
                };
                if location.is_main {
                    main.push(result);
                } else {
                    other.push(result);
                }
            }
        }

        (main, other)
    }

    fn object_results(&self, term: &str, all_terms: &[String]) -> Vec<SearchResult> {
        let other_terms: Vec<&str> =
            all_terms.iter().map(String::as_str).filter(|t| *t != term).collect();
        let mut results = Vec::new();

        for (prefix, entry) in self.index.iter_objects() {
            let fullname = entry.fullname(prefix);
            let fullname_lower = fullname.to_lowercase();
            if !fullname_lower.contains(term) {
                continue;
            }
            let Some((docname, filename, page_title)) = self.index.document(entry.doc_id) else {
                continue;
            };

            let last_segment = fullname_lower.rsplit('.').next().unwrap_or_default();
            let mut score = 0;
            if fullname_lower == term || last_segment == term {
                score += self.scorer.obj_name_match;
            } else if last_segment.contains(term) {
                score += self.scorer.obj_partial_match;
            }

            let label = self.index.objname(entry.type_id).map(|n| n.label.as_str()).unwrap_or("");
            if !other_terms.is_empty() {
                let haystack =
                    format!("{} {} {} {}", prefix, entry.name, label, page_title).to_lowercase();
                if other_terms.iter().any(|other| !haystack.contains(other)) {
                    continue;
                }
            }

            score += self.scorer.priority_score(entry.priority);
            results.push(SearchResult {
                docname: docname.to_string(),
                title: fullname.clone(),
                anchor: fragment(&self.index.resolve_anchor(prefix, entry)),
                description: Some(format!("{}, in {}", label, page_title)),
                score,
                filename: filename.to_string(),
                kind: ResultKind::Object,
            });
        }

        results
    }

    fn term_results(&self, query: &ParsedQuery) -> Vec<SearchResult> {
        let terms = &self.index.terms;
        let title_terms = &self.index.titleterms;

        // doc id -> (word -> best score for that word)
        let mut file_scores: BTreeMap<usize, BTreeMap<&str, i32>> = BTreeMap::new();

        for word in &query.search_terms {
            let mut records: Vec<(&Postings, i32)> = Vec::new();
            if let Some(postings) = terms.get(word) {
                records.push((postings, self.scorer.term));
            }
            if let Some(postings) = title_terms.get(word) {
                records.push((postings, self.scorer.title));
            }

            if word.chars().count() > 2 {
                if !terms.contains_key(word) {
                    records.extend(
                        terms
                            .iter()
                            .filter(|(key, _)| key.contains(word.as_str()))
                            .map(|(_, postings)| (postings, self.scorer.partial_term)),
                    );
                }
                if !title_terms.contains_key(word) {
                    records.extend(
                        title_terms
                            .iter()
                            .filter(|(key, _)| key.contains(word.as_str()))
                            .map(|(_, postings)| (postings, self.scorer.partial_title)),
                    );
                }
            }

            for (postings, score) in records {
                for &doc_id in postings.ids() {
                    let best =
                        file_scores.entry(doc_id).or_default().entry(word.as_str()).or_insert(score);
                    *best = (*best).max(score);
                }
            }
        }

        let required = query.search_terms.len();
        let required_long = query.search_terms.iter().filter(|t| t.chars().count() > 2).count();
        let mut results = Vec::new();

        for (doc_id, word_scores) in file_scores {
            let matched = word_scores.len();
            if matched != required && matched != required_long {
                continue;
            }
            if self.is_excluded(doc_id, query) {
                continue;
            }
            let Some((docname, filename, title)) = self.index.document(doc_id) else {
                continue;
            };
            let score = word_scores.values().copied().max().unwrap_or_default();
            results.push(SearchResult {
                docname: docname.to_string(),
                title: title.to_string(),
                anchor: String::new(),
                description: None,
                score,
                filename: filename.to_string(),
                kind: ResultKind::Text,
            });
        }

        results
    }

    fn is_excluded(&self, doc_id: usize, query: &ParsedQuery) -> bool {
        query.excluded_terms.iter().any(|term| {
            self.index.terms.get(term).is_some_and(|p| p.contains(doc_id))
                || self.index.titleterms.get(term).is_some_and(|p| p.contains(doc_id))
        })
    }
}

fn fragment(anchor: &str) -> String {
    format!("#{}", anchor)
}

/// `round(weight * part / whole)`, rounding halves away from zero
fn ratio_score(weight: i32, part: usize, whole: usize) -> i32 {
    if whole == 0 {
        return weight;
    }
    (f64::from(weight) * part as f64 / whole as f64).round() as i32
}

/// Identity of a result for deduplication; the score and kind are not part of it
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ResultKey {
    docname: String,
    title: String,
    anchor: String,
    description: Option<String>,
    filename: String,
}

impl ResultKey {
    fn of(result: &SearchResult) -> Self {
        Self {
            docname: result.docname.clone(),
            title: result.title.clone(),
            anchor: result.anchor.clone(),
            description: result.description.clone(),
            filename: result.filename.clone(),
        }
    }
}

/// Keep the best-scoring copy of each result, preserving first-seen order
fn dedupe(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut positions: std::collections::HashMap<ResultKey, usize> =
        std::collections::HashMap::new();
    let mut unique: Vec<SearchResult> = Vec::with_capacity(results.len());

    for result in results {
        let key = ResultKey::of(&result);
        match positions.get(&key) {
            Some(&pos) => {
                if result.score > unique[pos].score {
                    unique[pos] = result;
                }
            }
            None => {
                positions.insert(key, unique.len());
                unique.push(result);
            }
        }
    }

    unique
}

fn compare_results(a: &SearchResult, b: &SearchResult) -> Ordering {
    b.score.cmp(&a.score).then_with(|| a.title.to_lowercase().cmp(&b.title.to_lowercase()))
}
