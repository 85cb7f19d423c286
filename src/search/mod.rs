mod index;
mod query;
mod tokenize;

use tracing::debug;

use crate::dataset::Dataset;

pub use index::{DocumentKind, SearchDocument, SearchIndex, build_search_index};
pub use query::{SearchResult, query};
pub use tokenize::tokenize;

/// Holds the current index. Queries before the first build return nothing.
#[derive(Debug, Default)]
pub struct SearchService {
    index: Option<SearchIndex>,
}

impl SearchService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a fresh index and swaps it in whole.
    pub fn rebuild(&mut self, dataset: &Dataset) {
        let index = build_search_index(dataset);
        debug!(
            documents = index.len(),
            terms = index.term_count(),
            "search index rebuilt"
        );
        self.index = Some(index);
    }

    pub fn is_built(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&SearchIndex> {
        self.index.as_ref()
    }

    pub fn query(&self, text: &str) -> Vec<SearchResult> {
        match &self.index {
            Some(index) => query(index, text),
            None => Vec::new(),
        }
    }
}
