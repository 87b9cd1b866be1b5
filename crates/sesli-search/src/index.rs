//! Read-only search index with literal substring matching.

use std::collections::HashSet;

use sesli_core::text;
use sesli_core::types::SearchResult;

use crate::error::CatalogError;

/// Number of results returned per query unless configured otherwise.
pub const DEFAULT_MAX_RESULTS: usize = 3;

/// A fixed, ordered set of results answering ranked substring queries.
///
/// Matching is case-insensitive under Turkish casing rules against the title
/// or the content. Matches are ordered by descending relevance; equal scores
/// keep catalog order. Folded copies of every title and content are computed
/// once at construction so queries only fold the query itself.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    entries: Vec<Entry>,
    max_results: usize,
}

#[derive(Debug, Clone)]
struct Entry {
    result: SearchResult,
    folded_title: String,
    folded_content: String,
}

impl SearchIndex {
    /// Build an index returning at most [`DEFAULT_MAX_RESULTS`] per query.
    ///
    /// Fails if two results share an id or a score lies outside `[0, 1]`.
    pub fn new(results: Vec<SearchResult>) -> Result<Self, CatalogError> {
        Self::with_max_results(results, DEFAULT_MAX_RESULTS)
    }

    /// Build an index with a custom result limit.
    pub fn with_max_results(
        results: Vec<SearchResult>,
        max_results: usize,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(results.len());
        let mut entries = Vec::with_capacity(results.len());

        for result in results {
            if !seen.insert(result.id()) {
                return Err(CatalogError::DuplicateId(result.id()));
            }
            let score = result.relevance_score();
            if !(0.0..=1.0).contains(&score) {
                return Err(CatalogError::ScoreOutOfRange {
                    id: result.id(),
                    score,
                });
            }
            entries.push(Entry {
                folded_title: text::fold(result.title()),
                folded_content: text::fold(result.content()),
                result,
            });
        }

        tracing::debug!(entries = entries.len(), max_results, "Search index built");

        Ok(Self {
            entries,
            max_results,
        })
    }

    /// Run a query. Empty queries and misses both yield an empty vector.
    pub fn search(&self, query: &str) -> Vec<SearchResult> {
        let needle = text::fold(query.trim());
        if needle.is_empty() {
            return Vec::new();
        }

        let mut hits: Vec<&SearchResult> = self
            .entries
            .iter()
            .filter(|e| e.folded_title.contains(&needle) || e.folded_content.contains(&needle))
            .map(|e| &e.result)
            .collect();

        // `sort_by` is stable, so ties keep catalog order.
        hits.sort_by(|a, b| b.relevance_score().total_cmp(&a.relevance_score()));
        hits.truncate(self.max_results);

        tracing::debug!(query = %query, result_count = hits.len(), "Search executed");

        hits.into_iter().cloned().collect()
    }

    /// Look up a result by id.
    pub fn get(&self, id: u32) -> Option<&SearchResult> {
        self.entries
            .iter()
            .map(|e| &e.result)
            .find(|r| r.id() == id)
    }

    /// Number of results in the catalog.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_results(&self) -> usize {
        self.max_results
    }
}

// =============================================================================
// Tests
// =============================================================================
