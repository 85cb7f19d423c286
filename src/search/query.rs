use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use tracing::trace;

use crate::dataset::Timestamp;

use super::index::{DocumentKind, SearchIndex};
use super::tokenize::{edit_distance_within, max_edit_distance, tokenize};

// BM25+ parameters.
const BM25_K: f32 = 1.2;
const BM25_B: f32 = 0.7;
const BM25_DELTA: f32 = 0.5;

const PREFIX_WEIGHT: f32 = 0.375;
const FUZZY_WEIGHT: f32 = 0.45;

#[derive(Clone, Debug, PartialEq)]
pub struct SearchResult {
    pub kind: DocumentKind,
    pub id: String,
    pub cluster_id: String,
    pub text: String,
    pub score: f32,
    pub author: Option<String>,
    pub timestamp: Option<Timestamp>,
    /// Index terms that satisfied the query, sorted.
    pub matched_terms: Vec<String>,
    /// Char positions in `text` to emphasise.
    pub highlights: Vec<usize>,
}

#[derive(Default)]
struct DocumentHit<'a> {
    score: f32,
    terms: BTreeSet<&'a str>,
}

fn bm25(frequency: f32, matching: f32, total: f32, length: f32, average: f32) -> f32 {
    let idf = (1.0 + (total - matching + 0.5) / (matching + 0.5)).ln();
    let norm = 1.0 - BM25_B + BM25_B * length / average.max(f32::EPSILON);
    idf * (BM25_DELTA + frequency * (BM25_K + 1.0) / (frequency + BM25_K * norm))
}

/// Index terms a single query term reaches, with their match weight.
/// Exact beats prefix beats fuzzy; each index term is reported once.
fn expand_term<'a>(index: &'a SearchIndex, query_term: &str) -> Vec<(&'a str, f32)> {
    let query_length = query_term.chars().count() as f32;
    let mut expanded = Vec::new();

    for term in index.terms_with_prefix(query_term) {
        let extra = term.chars().count() as f32 - query_length;
        let weight = if extra == 0.0 {
            1.0
        } else {
            PREFIX_WEIGHT * query_length / (query_length + 0.3 * extra)
        };
        expanded.push((term, weight));
    }

    let limit = max_edit_distance(query_term);
    if limit > 0 {
        for term in index.terms() {
            if term.starts_with(query_term) {
                continue;
            }
            if let Some(distance) = edit_distance_within(query_term, term, limit) {
                let weight = FUZZY_WEIGHT * query_length / (query_length + distance as f32);
                expanded.push((term, weight));
            }
        }
    }

    expanded
}

fn score_term<'a>(index: &'a SearchIndex, query_term: &str) -> HashMap<usize, DocumentHit<'a>> {
    let total = index.len() as f32;
    let mut hits: HashMap<usize, DocumentHit<'a>> = HashMap::new();

    for (term, weight) in expand_term(index, query_term) {
        let Some(postings) = index.postings(term) else {
            continue;
        };

        let mut matching = [0u32; 3];
        for posting in postings {
            matching[posting.field as usize] += 1;
        }

        for posting in postings {
            let field = posting.field;
            let raw = bm25(
                posting.frequency as f32,
                matching[field as usize] as f32,
                total,
                index.field_length(posting.document, field),
                index.average_field_length(field),
            );
            let hit = hits.entry(posting.document).or_default();
            hit.score += weight * field.boost() * raw;
            hit.terms.insert(term);
        }
    }

    hits
}

fn highlight_indices(matcher: &SkimMatcherV2, text: &str, terms: &BTreeSet<&str>) -> Vec<usize> {
    let mut indices = BTreeSet::new();
    for term in terms {
        if let Some((_, positions)) = matcher.fuzzy_indices(text, term) {
            indices.extend(positions);
        }
    }
    indices.into_iter().collect()
}

/// Conjunctive query: every query term must reach a document through an
/// exact, prefix or fuzzy match. Results are sorted by descending score.
pub fn query(index: &SearchIndex, text: &str) -> Vec<SearchResult> {
    let query_terms = tokenize(text);
    if query_terms.is_empty() || index.is_empty() {
        return Vec::new();
    }

    let mut combined: Option<HashMap<usize, DocumentHit<'_>>> = None;
    for query_term in &query_terms {
        let hits = score_term(index, query_term);
        combined = Some(match combined {
            None => hits,
            Some(mut acc) => {
                acc.retain(|document, _| hits.contains_key(document));
                for (document, hit) in hits {
                    if let Some(existing) = acc.get_mut(&document) {
                        existing.score += hit.score;
                        existing.terms.extend(hit.terms);
                    }
                }
                acc
            }
        });
        if combined.as_ref().is_some_and(HashMap::is_empty) {
            break;
        }
    }

    let mut ranked = combined
        .unwrap_or_default()
        .into_iter()
        .collect::<Vec<_>>();
    let quality = query_terms.len() as f32;
    ranked.sort_by(|(left_doc, left), (right_doc, right)| {
        right
            .score
            .partial_cmp(&left.score)
            .unwrap_or(Ordering::Equal)
            .then(left_doc.cmp(right_doc))
    });

    let matcher = SkimMatcherV2::default();
    let results = ranked
        .into_iter()
        .map(|(document_index, hit)| {
            let document = index.document(document_index);
            let text = document.display_text().to_owned();
            SearchResult {
                kind: document.kind,
                id: document.id.clone(),
                cluster_id: document.cluster_id.clone(),
                highlights: highlight_indices(&matcher, &text, &hit.terms),
                text,
                score: hit.score * quality,
                author: document.author.clone(),
                timestamp: document.timestamp.clone(),
                matched_terms: hit.terms.into_iter().map(str::to_owned).collect(),
            }
        })
        .collect::<Vec<_>>();

    trace!(query = text, results = results.len(), "search query");
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::index::SearchDocument;

    fn document(kind: DocumentKind, id: &str, title: &str, text: &str) -> SearchDocument {
        SearchDocument {
            kind,
            id: id.into(),
            cluster_id: "cx:c".into(),
            title: title.into(),
            text: text.into(),
            author: None,
            timestamp: None,
        }
    }

    fn index() -> SearchIndex {
        SearchIndex::from_documents(vec![
            document(
                DocumentKind::Cluster,
                "cluster:cx:w",
                "Witness Management",
                "Scheduling witnesses and testimony",
            ),
            document(
                DocumentKind::Thread,
                "thread:cx:w:t",
                "Testimony intake",
                "Collecting witness statements ahead of a hearing",
            ),
            document(
                DocumentKind::Comment,
                "comment:cx:a:t:m",
                "Budget lines for the appropriations cycle",
                "Budget lines for the appropriations cycle",
            ),
        ])
    }

    #[test]
    fn expanded_terms_outlive_the_query_text() {
        let index = index();
        let query_term = String::from("witnes");
        let expanded = expand_term(&index, &query_term);
        drop(query_term);

        let terms = expanded.iter().map(|(term, _)| *term).collect::<Vec<_>>();
        assert!(terms.contains(&"witness"));
        assert!(terms.contains(&"witnesses"));
        assert!(expanded.iter().all(|(_, weight)| *weight > 0.0 && *weight < 1.0));
    }

    #[test]
    fn empty_and_separator_only_queries_return_nothing() {
        let index = index();
        assert!(query(&index, "").is_empty());
        assert!(query(&index, "   ").is_empty());
        assert!(query(&index, "-- ::").is_empty());
    }

    #[test]
    fn title_match_outranks_body_match() {
        let results = query(&index(), "witness");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "cluster:cx:w");
        assert_eq!(results[0].kind, DocumentKind::Cluster);
        assert!(results[0].score > results[1].score);
    }

    #[test]
    fn prefix_and_fuzzy_terms_match() {
        let index = index();
        let prefix = query(&index, "approp");
        assert_eq!(prefix.len(), 1);
        assert_eq!(prefix[0].matched_terms, vec!["appropriations"]);

        let fuzzy = query(&index, "testimny");
        assert_eq!(fuzzy.len(), 2);
        assert!(fuzzy.iter().all(|result| result.matched_terms == ["testimony"]));
    }

    #[test]
    fn every_term_must_match() {
        let index = index();
        let both = query(&index, "witness hearing");
        assert_eq!(both.len(), 1);
        assert_eq!(both[0].id, "thread:cx:w:t");

        assert!(query(&index, "witness appropriations").is_empty());
    }

    #[test]
    fn highlights_point_into_display_text() {
        let results = query(&index(), "manage");
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.text, "Witness Management");
        let chars = result.text.chars().collect::<Vec<_>>();
        let highlighted = result
            .highlights
            .iter()
            .map(|&index| chars[index].to_ascii_lowercase())
            .collect::<String>();
        assert_eq!(highlighted, "management");
    }

    #[test]
    fn scores_are_finite_and_positive() {
        for result in query(&index(), "budget cycle") {
            assert!(result.score.is_finite());
            assert!(result.score > 0.0);
        }
    }
}
