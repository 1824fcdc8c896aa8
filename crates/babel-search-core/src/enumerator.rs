//! Deterministic query → candidate-address enumeration.
//!
//! The enumerator turns free-form query text into a ranked list of
//! [`Candidate`] addresses. It is a ranking heuristic, not an index
//! inverter: nothing guarantees the produced addresses generate pages
//! containing the query.
//!
//! # Algorithm
//!
//! 1. Normalize the query (lowercase, collapse whitespace, trim).
//! 2. Extract character n-grams inside whitespace-delimited tokens,
//!    longest size first, left to right, deduplicated on first sight.
//! 3. For each n-gram and each variant `1..=depth`, derive the address
//!    `hex(SHA-256("{gram}:{variant}"))` scored `len(gram) + 1/(variant+1)`,
//!    so longer fragments dominate and earlier variants outrank later ones.
//! 4. Merge candidates sharing an address (union provenance, sum scores,
//!    keep the smallest variant).
//! 5. Rank by score descending, ties by address ascending; truncate.
//!
//! Every step is a pure function of the query and configuration, so the
//! output is byte-identical across calls and processes.

use std::collections::{BTreeMap, HashSet};

use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::EnumeratorConfig;
use crate::error::{EngineError, EngineResult};
use crate::generator::hex_lower;
use crate::types::Candidate;

/// Normalize query text: lowercase, collapse internal whitespace runs to
/// single spaces, trim the outside.
#[must_use]
pub fn normalize_query(query: &str) -> String {
    query
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extract unique n-grams of sizes `max_size` down to `min_size`.
///
/// N-grams are contiguous character runs inside whitespace-delimited
/// tokens; they never span a space. Within a size, tokens are visited left
/// to right and offsets left to right, and the first occurrence of a gram
/// wins on dedup, so the output order is deterministic.
#[must_use]
pub fn extract_ngrams(text: &str, min_size: usize, max_size: usize) -> Vec<String> {
    let tokens: Vec<Vec<char>> = text
        .split_whitespace()
        .map(|t| t.chars().collect())
        .collect();

    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for size in (min_size..=max_size).rev() {
        if size == 0 {
            break;
        }
        for token in &tokens {
            if token.len() < size {
                continue;
            }
            for window in token.windows(size) {
                let gram: String = window.iter().collect();
                if seen.insert(gram.clone()) {
                    out.push(gram);
                }
            }
        }
    }

    out
}

/// Enumerate up to `max_results` candidate addresses for `query`.
///
/// `depth` controls how many deterministic address variants are derived
/// per n-gram. N-gram sizes come from `config`.
///
/// # Errors
///
/// - [`EngineError::InvalidQuery`] when the query normalizes to nothing.
/// - [`EngineError::InvalidConfig`] when `depth`, `max_results`, or the
///   configured n-gram bounds are out of range.
///
/// A query too short to yield any n-gram produces `Ok` with an empty list.
pub fn enumerate(
    query: &str,
    max_results: usize,
    depth: u32,
    config: &EnumeratorConfig,
) -> EngineResult<Vec<Candidate>> {
    config.validate()?;
    if depth < 1 {
        return Err(EngineError::InvalidConfig {
            field: "depth".to_string(),
            message: "must be at least 1".to_string(),
        });
    }
    if max_results < 1 {
        return Err(EngineError::InvalidConfig {
            field: "max_results".to_string(),
            message: "must be at least 1".to_string(),
        });
    }

    let normalized = normalize_query(query);
    if normalized.is_empty() {
        return Err(EngineError::InvalidQuery {
            reason: "normalized query is empty".to_string(),
        });
    }

    let ngrams = extract_ngrams(&normalized, config.min_ngram, config.max_ngram);
    debug!(
        query = %normalized,
        ngram_count = ngrams.len(),
        depth,
        "enumerating candidate addresses"
    );

    // Keyed by address; BTreeMap keeps merge order independent of hash
    // iteration order.
    let mut by_address: BTreeMap<String, Candidate> = BTreeMap::new();

    for gram in &ngrams {
        let gram_len = gram.chars().count() as f64;
        for variant in 1..=depth {
            let digest = Sha256::digest(format!("{gram}:{variant}").as_bytes());
            let address = hex_lower(&digest);
            let score = gram_len + 1.0 / f64::from(variant + 1);
            let candidate = Candidate::new(address.clone(), score, gram.clone(), variant);

            match by_address.get_mut(&address) {
                Some(existing) => existing.merge(candidate),
                None => {
                    by_address.insert(address, candidate);
                }
            }
        }
    }

    let mut candidates: Vec<Candidate> = by_address.into_values().collect();
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.address.cmp(&b.address))
    });
    candidates.truncate(max_results);

    Ok(candidates)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn defaults() -> EnumeratorConfig {
        EnumeratorConfig::default()
    }

    #[test]
    fn normalize_collapses_and_lowercases() {
        assert_eq!(normalize_query("  Hello\t  WORLD \n"), "hello world");
        assert_eq!(normalize_query(""), "");
        assert_eq!(normalize_query("   \t\n "), "");
    }

    #[test]
    fn ngrams_are_longest_first_and_word_bounded() {
        let grams = extract_ngrams("hello world", 2, 5);

        assert_eq!(grams[0], "hello");
        assert!(grams.contains(&"world".to_string()));
        assert!(grams.iter().all(|g| !g.contains(' ')));

        // longest-first ordering
        let sizes: Vec<usize> = grams.iter().map(|g| g.chars().count()).collect();
        let mut sorted = sizes.clone();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        assert_eq!(sizes, sorted);
    }

    #[test]
    fn ngrams_dedupe_on_first_sight() {
        let grams = extract_ngrams("abab abab", 2, 3);
        let mut unique = grams.clone();
        unique.dedup();
        assert_eq!(grams.len(), grams.iter().collect::<HashSet<_>>().len());
        assert_eq!(grams, unique);
    }

    #[test]
    fn short_tokens_yield_nothing() {
        assert!(extract_ngrams("a", 2, 5).is_empty());
        assert!(extract_ngrams("a b c", 2, 5).is_empty());
    }

    #[test]
    fn enumeration_is_deterministic() {
        let a = enumerate("hello world", 10, 2, &defaults()).unwrap();
        let b = enumerate("hello world", 10, 2, &defaults()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn empty_query_is_invalid() {
        for query in ["", "   ", "\t\n"] {
            let err = enumerate(query, 5, 2, &defaults()).unwrap_err();
            assert!(matches!(err, EngineError::InvalidQuery { .. }));
        }
    }

    #[test]
    fn sub_minimum_query_yields_zero_candidates() {
        let candidates = enumerate("a", 5, 2, &defaults()).unwrap();
        assert!(candidates.is_empty());
    }

    #[test]
    fn zero_depth_is_invalid_config() {
        let err = enumerate("hello", 5, 0, &defaults()).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }

    #[test]
    fn bad_ngram_bounds_are_invalid_config() {
        let config = EnumeratorConfig {
            min_ngram: 7,
            max_ngram: 5,
            ..defaults()
        };
        let err = enumerate("hello", 5, 2, &config).unwrap_err();
        assert!(matches!(err, EngineError::InvalidConfig { .. }));
    }

    #[test]
    fn addresses_are_full_lowercase_hex() {
        let candidates = enumerate("hello", 5, 1, &defaults()).unwrap();
        assert!(!candidates.is_empty());
        for c in &candidates {
            assert_eq!(c.address.len(), 64);
            assert!(c
                .address
                .chars()
                .all(|ch| ch.is_ascii_hexdigit() && !ch.is_ascii_uppercase()));
        }
    }

    #[test]
    fn scores_are_non_increasing_with_address_tiebreak() {
        let candidates = enumerate("hello world again", 20, 2, &defaults()).unwrap();
        for pair in candidates.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            assert!(a.score >= b.score);
            if (a.score - b.score).abs() < f64::EPSILON {
                assert!(a.address < b.address);
            }
        }
    }

    #[test]
    fn truncation_respects_max_results() {
        let candidates = enumerate("hello world", 3, 2, &defaults()).unwrap();
        assert_eq!(candidates.len(), 3);
    }

    #[test]
    fn full_words_surface_in_top_results() {
        // "hello" and "world" are the only size-5 grams, so their
        // first-variant candidates outrank everything else.
        let candidates = enumerate("hello world", 5, 2, &defaults()).unwrap();
        assert_eq!(candidates.len(), 5);
        assert!(candidates
            .iter()
            .any(|c| c.ngrams.contains("hello")));
        assert!(candidates
            .iter()
            .any(|c| c.ngrams.contains("world")));
    }

    #[test]
    fn variant_depth_is_recorded() {
        let candidates = enumerate("hello", 20, 3, &defaults()).unwrap();
        assert!(candidates.iter().any(|c| c.depth == 1));
        assert!(candidates.iter().any(|c| c.depth == 2));
        assert!(candidates.iter().any(|c| c.depth == 3));
    }

    #[test]
    fn earlier_variants_outscore_later_ones() {
        let candidates = enumerate("hello", 10, 2, &defaults()).unwrap();
        let v1 = candidates
            .iter()
            .find(|c| c.ngrams.contains("hello") && c.depth == 1)
            .unwrap();
        let v2 = candidates
            .iter()
            .find(|c| c.ngrams.contains("hello") && c.depth == 2)
            .unwrap();
        assert!(v1.score > v2.score);
    }
}
