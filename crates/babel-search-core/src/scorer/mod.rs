//! Multi-metric coherence scoring.
//!
//! [`CoherenceScorer`] judges how language-like a page of text is, and —
//! when a query is supplied — how relevant it is to that query. Four
//! sub-metrics feed a weighted overall score in `[0, 100]`:
//!
//! - **language**: density of common English words among the tokens
//! - **structure**: sentence/punctuation cadence and letter/space balance
//! - **ngram**: letter-bigram entropy distance from the band where
//!   English text lives
//! - **exact**: query substring coverage (occurrence count, with partial
//!   3-gram coverage as fallback)
//!
//! Scoring is total: any finite text and any query produce a score, and
//! repeated evaluation is bit-exact. Empty text scores all zeros.
//!
//! When no query is supplied the exact-match metric carries no signal, so
//! its weight is excluded and the remaining weights renormalize; the
//! overall score always equals the effective weighted sum of sub-scores.

mod lexicon;


use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::config::invalid;
use crate::error::EngineResult;
use crate::types::{CoherenceScore, ConfidenceLevel};

use lexicon::is_common_word;

/// Bigram entropy (bits) around which coherent English text clusters.
/// Uniform 29-symbol noise measures ≈9.2 bits over a full page.
const ENTROPY_TARGET_BITS: f64 = 5.2;

/// Penalty per bit of distance from [`ENTROPY_TARGET_BITS`].
const ENTROPY_SLOPE: f64 = 15.0;

/// Score awarded for the first exact query occurrence.
const EXACT_BASE: f64 = 70.0;

/// Per-extra-occurrence bonus and its cap.
const EXACT_REPEAT_BONUS: f64 = 5.0;
const EXACT_REPEAT_CAP: f64 = 30.0;

/// Relative weights of the four sub-metrics.
///
/// Weights are non-negative and normalized to sum 1 before use; the
/// defaults favor language density and query relevance.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub language: f64,
    pub structure: f64,
    pub ngram: f64,
    pub exact: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            language: 0.30,
            structure: 0.20,
            ngram: 0.20,
            exact: 0.30,
        }
    }
}

impl ScoringWeights {
    /// Reject negative, non-finite, or all-zero weight sets.
    pub fn validate(&self) -> EngineResult<()> {
        let parts = [self.language, self.structure, self.ngram, self.exact];
        if parts.iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(invalid(
                "scoring.weights",
                "weights must be finite and non-negative",
            ));
        }
        if parts.iter().sum::<f64>() <= 0.0 {
            return Err(invalid("scoring.weights", "weights must not all be zero"));
        }
        Ok(())
    }

    /// Scaled copy summing to 1.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let sum = self.language + self.structure + self.ngram + self.exact;
        if sum <= 0.0 {
            return Self::default();
        }
        Self {
            language: self.language / sum,
            structure: self.structure / sum,
            ngram: self.ngram / sum,
            exact: self.exact / sum,
        }
    }
}

#[derive(Debug, Default)]
struct LanguageStats {
    score: f64,
    token_count: usize,
    english_tokens: usize,
}

#[derive(Debug, Default)]
struct StructureStats {
    score: f64,
    period_count: usize,
    letter_ratio: f64,
    space_ratio: f64,
}

#[derive(Debug, Default)]
struct BigramStats {
    score: f64,
    bigram_count: usize,
    distinct_bigrams: usize,
    entropy_bits: f64,
}

/// Coherence scoring engine.
///
/// Cheap to clone; carries only the configured weights.
#[derive(Debug, Clone)]
pub struct CoherenceScorer {
    weights: ScoringWeights,
}

impl Default for CoherenceScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

impl CoherenceScorer {
    /// Create a scorer with the given weights (normalized at use).
    #[must_use]
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// The weights actually applied for a request with or without a query:
    /// normalized, with the exact-match weight redistributed when there is
    /// no query to match against.
    #[must_use]
    pub fn effective_weights(&self, has_query: bool) -> ScoringWeights {
        let w = self.weights.normalized();
        if has_query {
            return w;
        }
        let denom = w.language + w.structure + w.ngram;
        if denom <= 0.0 {
            // exact-only weighting with no query: nothing carries signal
            return ScoringWeights {
                language: 0.0,
                structure: 0.0,
                ngram: 0.0,
                exact: 0.0,
            };
        }
        ScoringWeights {
            language: w.language / denom,
            structure: w.structure / denom,
            ngram: w.ngram / denom,
            exact: 0.0,
        }
    }

    /// Score `text`, optionally conditioned on `query`.
    ///
    /// Total: never fails, for any inputs. Empty text yields the all-zero
    /// score with `Minimal` confidence.
    #[must_use]
    pub fn score(&self, text: &str, query: Option<&str>) -> CoherenceScore {
        if text.is_empty() {
            return CoherenceScore::zero();
        }

        let query = query.map(str::trim).filter(|q| !q.is_empty());
        let lower = text.to_lowercase();

        let language = language_stats(&lower);
        let structure = structure_stats(text);
        let bigrams = bigram_stats(&lower);
        let (exact, occurrences) = match query {
            Some(q) => exact_match_score(&lower, q),
            None => (0.0, 0),
        };

        let w = self.effective_weights(query.is_some());
        let overall = (w.language * language.score
            + w.structure * structure.score
            + w.ngram * bigrams.score
            + w.exact * exact)
            .clamp(0.0, 100.0);

        let mut metrics = BTreeMap::new();
        metrics.insert("token_count".to_string(), language.token_count as f64);
        metrics.insert(
            "english_token_count".to_string(),
            language.english_tokens as f64,
        );
        metrics.insert("period_count".to_string(), structure.period_count as f64);
        metrics.insert("letter_ratio".to_string(), structure.letter_ratio);
        metrics.insert("space_ratio".to_string(), structure.space_ratio);
        metrics.insert("bigram_count".to_string(), bigrams.bigram_count as f64);
        metrics.insert(
            "distinct_bigrams".to_string(),
            bigrams.distinct_bigrams as f64,
        );
        metrics.insert("bigram_entropy".to_string(), bigrams.entropy_bits);
        if query.is_some() {
            metrics.insert("exact_occurrences".to_string(), occurrences as f64);
        }

        CoherenceScore {
            language_score: language.score,
            structure_score: structure.score,
            ngram_score: bigrams.score,
            exact_match_score: exact,
            overall_score: overall,
            confidence_level: ConfidenceLevel::from_overall(overall),
            metrics,
        }
    }
}

/// Common-word density over whitespace tokens.
///
/// Tokens are stripped of leading/trailing non-alphanumerics before lexicon
/// lookup, so "dog." counts as "dog". Expects pre-lowercased input.
fn language_stats(lower: &str) -> LanguageStats {
    let mut token_count = 0usize;
    let mut english_tokens = 0usize;

    for raw in lower.split_whitespace() {
        let token = raw.trim_matches(|c: char| !c.is_ascii_alphanumeric());
        if token.is_empty() {
            continue;
        }
        token_count += 1;
        if is_common_word(token) {
            english_tokens += 1;
        }
    }

    let score = if token_count == 0 {
        0.0
    } else {
        (100.0 * english_tokens as f64 / token_count as f64).round().min(100.0)
    };

    LanguageStats {
        score,
        token_count,
        english_tokens,
    }
}

/// Sentence/punctuation structure: additive components, clipped to 100.
fn structure_stats(text: &str) -> StructureStats {
    let len = text.chars().count();
    if len == 0 {
        return StructureStats::default();
    }

    let mut score: f64 = 0.0;

    if text.chars().any(|c| matches!(c, '.' | '!' | '?')) {
        score += 30.0;
    }

    let period_count = text.chars().filter(|c| *c == '.').count();
    if period_count >= 3 && period_count as f64 <= len as f64 / 80.0 {
        score += 20.0;
    }

    if text.matches(", ").count() >= 2 {
        score += 20.0;
    }

    let letters = text.chars().filter(|c| c.is_alphabetic()).count();
    let letter_ratio = letters as f64 / len as f64;
    if (0.55..=0.85).contains(&letter_ratio) {
        score += 15.0;
    }

    let spaces = text.chars().filter(|c| *c == ' ').count();
    let space_ratio = spaces as f64 / len as f64;
    if (0.10..=0.25).contains(&space_ratio) {
        score += 15.0;
    }

    StructureStats {
        score: score.min(100.0),
        period_count,
        letter_ratio,
        space_ratio,
    }
}

/// Letter-bigram entropy coherence.
///
/// Bigrams are adjacent pairs in the stream of ASCII letters (whitespace
/// and punctuation are skipped). The score decays linearly with the
/// distance of the observed Shannon entropy from the band where English
/// text lives: coherent prose lands around 70, uniform alphabet noise
/// around 40, heavily repetitive text near 100.
fn bigram_stats(lower: &str) -> BigramStats {
    let mut counts: HashMap<(char, char), u64> = HashMap::new();
    let mut prev: Option<char> = None;
    let mut total = 0u64;

    for c in lower.chars().filter(char::is_ascii_lowercase) {
        if let Some(p) = prev {
            *counts.entry((p, c)).or_insert(0) += 1;
            total += 1;
        }
        prev = Some(c);
    }

    if total == 0 {
        return BigramStats::default();
    }

    let mut entropy = 0.0f64;
    for count in counts.values() {
        let p = *count as f64 / total as f64;
        entropy -= p * p.log2();
    }

    let score = (100.0 - (entropy - ENTROPY_TARGET_BITS).abs() * ENTROPY_SLOPE).clamp(0.0, 100.0);

    BigramStats {
        score,
        bigram_count: total as usize,
        distinct_bigrams: counts.len(),
        entropy_bits: entropy,
    }
}

/// Query substring coverage. Expects pre-lowercased text.
///
/// One or more exact occurrences score 70 plus a small bonus per repeat;
/// with none, the fraction of the query's character 3-grams present in the
/// text scores up to 50. Returns the score and the occurrence count.
fn exact_match_score(lower: &str, query: &str) -> (f64, usize) {
    let needle = query.to_lowercase();
    if needle.is_empty() {
        return (0.0, 0);
    }

    let occurrences = lower.matches(needle.as_str()).count();
    if occurrences >= 1 {
        let bonus = (EXACT_REPEAT_BONUS * (occurrences as f64 - 1.0)).min(EXACT_REPEAT_CAP);
        return ((EXACT_BASE + bonus).min(100.0), occurrences);
    }

    let chars: Vec<char> = needle.chars().collect();
    if chars.len() < 3 {
        return (0.0, 0);
    }
    let grams: std::collections::HashSet<String> =
        chars.windows(3).map(|w| w.iter().collect()).collect();
    let present = grams.iter().filter(|g| lower.contains(g.as_str())).count();

    (present as f64 / grams.len() as f64 * 50.0, 0)
}
