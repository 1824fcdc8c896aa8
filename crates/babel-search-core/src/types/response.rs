//! Search responses and cache entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::page::DecodedPage;

/// Result of one `search` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    /// The query as the caller supplied it.
    pub query: String,

    /// Ranked results: overall score descending, ties by address ascending.
    pub results: Vec<DecodedPage>,

    /// Number of pages that cleared the minimum score, before truncation
    /// to the requested result count.
    pub total_found: usize,

    /// End-to-end latency of this call.
    pub elapsed_ms: u64,

    /// Whether the results were served from the cache.
    pub from_cache: bool,

    /// Whether the deadline expired and the results are a partial set.
    /// Partial responses are never cached.
    pub partial: bool,
}

impl SearchResponse {
    /// An empty, successfully computed response.
    #[must_use]
    pub fn empty(query: String, elapsed_ms: u64) -> Self {
        Self {
            query,
            results: Vec::new(),
            total_found: 0,
            elapsed_ms,
            from_cache: false,
            partial: false,
        }
    }

    /// Top-ranked result, if any.
    #[must_use]
    pub fn top_result(&self) -> Option<&DecodedPage> {
        self.results.first()
    }

    /// Result count shortcut.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the response carries no results.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// One memoized search result list.
///
/// Entries are immutable once inserted; expiry is wall-clock elapsed time
/// relative to `created_at` against the cache TTL. `total_found` rides
/// along so a cache hit reproduces the original response verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Request fingerprint this entry answers.
    pub fingerprint: String,

    /// The ranked result list at insertion time.
    pub results: Vec<DecodedPage>,

    /// Pre-truncation match count of the original computation.
    pub total_found: usize,

    /// Insertion time per the engine clock.
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_response_has_no_results() {
        let resp = SearchResponse::empty("foo".to_string(), 3);
        assert!(resp.is_empty());
        assert_eq!(resp.len(), 0);
        assert_eq!(resp.total_found, 0);
        assert!(resp.top_result().is_none());
        assert!(!resp.partial);
    }
}
