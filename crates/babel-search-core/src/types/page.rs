//! Decoded pages and their provenance.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::coherence::CoherenceScore;

/// Number of leading characters exposed by [`DecodedPage::snippet`].
pub const SNIPPET_LENGTH: usize = 240;

/// Which collaborator materialized a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSource {
    /// The deterministic local generator.
    Local,
    /// An external page source (or externally supplied text).
    Remote,
}

/// How and when a page was decoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Wall-clock time of the decode.
    pub timestamp: DateTime<Utc>,

    /// Whether the normalization hook rewrote this page's text.
    pub normalized: bool,

    /// Which collaborator produced the raw text.
    pub source: PageSource,
}

/// A scored page with full provenance: the unit of search results.
///
/// Immutable once constructed; the cache and the API layer clone it freely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedPage {
    /// Address the page was retrieved under.
    pub address: String,

    /// The page text as retrieved (3200 alphabet symbols for generated
    /// and validated remote pages).
    pub raw_text: String,

    /// The normalized query this page was scored against, if any.
    pub query: Option<String>,

    /// Which collaborator produced `raw_text`.
    pub source: PageSource,

    /// Coherence judgment of `raw_text` relative to `query`.
    pub coherence: CoherenceScore,

    /// Output of the normalization hook, when it ran on this page.
    pub normalized_text: Option<String>,

    /// Decode timestamp, normalization flag, and source tag.
    pub provenance: Provenance,
}

impl DecodedPage {
    /// Build a freshly decoded, un-normalized page.
    #[must_use]
    pub fn new(
        address: String,
        raw_text: String,
        query: Option<String>,
        source: PageSource,
        coherence: CoherenceScore,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            address,
            raw_text,
            query,
            source,
            coherence,
            normalized_text: None,
            provenance: Provenance {
                timestamp,
                normalized: false,
                source,
            },
        }
    }

    /// Attach the output of the normalization hook.
    #[must_use]
    pub fn with_normalized_text(mut self, text: String) -> Self {
        self.normalized_text = Some(text);
        self.provenance.normalized = true;
        self
    }

    /// Leading slice of the raw text for listings and logs.
    #[must_use]
    pub fn snippet(&self) -> &str {
        let end = self
            .raw_text
            .char_indices()
            .nth(SNIPPET_LENGTH)
            .map_or(self.raw_text.len(), |(i, _)| i);
        &self.raw_text[..end]
    }

    /// Overall coherence score shortcut.
    #[inline]
    #[must_use]
    pub fn overall_score(&self) -> f64 {
        self.coherence.overall_score
    }
}
