//! Structured coherence scores and confidence bucketing.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Coarse confidence bucket derived from the overall coherence score.
///
/// Thresholds are fixed:
///
/// | overall      | level   |
/// |--------------|---------|
/// | `>= 80`      | High    |
/// | `[60, 80)`   | Medium  |
/// | `[40, 60)`   | Sparse  |
/// | `< 40`       | Minimal |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    /// Strongly language-like and/or query-relevant.
    High,
    /// Recognizable structure with meaningful signal.
    Medium,
    /// Weak signal over mostly noise.
    Sparse,
    /// Indistinguishable from noise.
    Minimal,
}

impl ConfidenceLevel {
    /// Bucket an overall score.
    #[must_use]
    pub fn from_overall(overall: f64) -> Self {
        if overall >= 80.0 {
            ConfidenceLevel::High
        } else if overall >= 60.0 {
            ConfidenceLevel::Medium
        } else if overall >= 40.0 {
            ConfidenceLevel::Sparse
        } else {
            ConfidenceLevel::Minimal
        }
    }
}

/// Multi-metric coherence judgment for a page of text.
///
/// All five scores lie in `[0, 100]`. `overall_score` is the weighted sum
/// of the sub-scores under the scorer's effective weights, and
/// `confidence_level` is [`ConfidenceLevel::from_overall`] of it.
///
/// `metrics` is a flat diagnostic surface (token counts, bigram entropy,
/// occurrence counts); consumers read known keys and ignore the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoherenceScore {
    /// English-like token density, `[0, 100]`.
    pub language_score: f64,

    /// Sentence/punctuation structure, `[0, 100]`.
    pub structure_score: f64,

    /// Letter-bigram frequency coherence, `[0, 100]`.
    pub ngram_score: f64,

    /// Query substring coverage, `[0, 100]`; `0` when no query was given.
    pub exact_match_score: f64,

    /// Weighted combination of the sub-scores, `[0, 100]`.
    pub overall_score: f64,

    /// Bucketed confidence derived from `overall_score`.
    pub confidence_level: ConfidenceLevel,

    /// Auxiliary diagnostics keyed by stable names.
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

impl CoherenceScore {
    /// The all-zero score assigned to empty text.
    #[must_use]
    pub fn zero() -> Self {
        Self {
            language_score: 0.0,
            structure_score: 0.0,
            ngram_score: 0.0,
            exact_match_score: 0.0,
            overall_score: 0.0,
            confidence_level: ConfidenceLevel::Minimal,
            metrics: BTreeMap::new(),
        }
    }

    /// Whether the overall score clears `min_score`.
    #[inline]
    #[must_use]
    pub fn clears(&self, min_score: f64) -> bool {
        self.overall_score >= min_score
    }
}
