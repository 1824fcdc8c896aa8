//! Core domain types.
//!
//! Everything here is an immutable value type: constructed once, cloned
//! freely, never mutated in place. Serialization derives are present
//! throughout so results can cross the API boundary and the cache can be
//! checkpointed.

mod candidate;
mod coherence;
mod page;
mod response;

pub use candidate::Candidate;
pub use coherence::{CoherenceScore, ConfidenceLevel};
pub use page::{DecodedPage, PageSource, Provenance, SNIPPET_LENGTH};
pub use response::{CacheEntry, SearchResponse};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Where the pipeline obtains pages for a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Materialize every candidate page with the local generator.
    #[default]
    Local,
    /// Fetch every candidate page from the configured remote source;
    /// per-address failures are logged and skipped.
    Remote,
    /// Try the remote source first, fall back to the generator per address.
    Hybrid,
}

impl SearchMode {
    /// All recognized modes, for diagnostics.
    pub const ALL: [SearchMode; 3] = [SearchMode::Local, SearchMode::Remote, SearchMode::Hybrid];

    /// Canonical lowercase name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchMode::Local => "local",
            SearchMode::Remote => "remote",
            SearchMode::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(SearchMode::Local),
            "remote" => Ok(SearchMode::Remote),
            "hybrid" => Ok(SearchMode::Hybrid),
            other => Err(EngineError::InvalidMode {
                mode: other.to_string(),
            }),
        }
    }
}
