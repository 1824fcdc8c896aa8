//! Pipeline behavior tests.
//!
//! # Test Categories
//!
//! 1. Ranking and determinism
//! 2. Cache behavior (hits, TTL expiry, idempotence)
//! 3. Boundary inputs (empty/short queries, zero budgets, high cutoffs)
//! 4. Remote and hybrid modes with stub sources
//! 5. Deadline behavior with paused time
//! 6. Normalization hook and decode
//!
//! All tests use stub collaborators and a [`ManualClock`], so nothing here
//! touches a network or real wall-clock TTLs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Duration as ChronoDuration;

use super::*;
use crate::clock::ManualClock;
use crate::error::EngineError;
use crate::stubs::{CollapseWhitespaceNormalizer, StaticPageSource};
use crate::types::ConfidenceLevel;

fn test_pipeline() -> (SearchPipeline, Arc<ManualClock>) {
    test_pipeline_with(Config::default())
}

fn test_pipeline_with(config: Config) -> (SearchPipeline, Arc<ManualClock>) {
    let clock = ManualClock::shared();
    let pipeline = SearchPipeline::with_clock(config, clock.clone()).unwrap();
    (pipeline, clock)
}

/// Address/score pairs, for comparisons that ignore timestamps.
fn ranking(response: &SearchResponse) -> Vec<(String, f64)> {
    response
        .results
        .iter()
        .map(|p| (p.address.clone(), p.coherence.overall_score))
        .collect()
}

/// A remote source that answers instantly for preloaded addresses and
/// hangs far past any deadline for everything else.
struct SlowPageSource {
    fast: HashMap<String, String>,
}

impl SlowPageSource {
    fn hang_everything() -> Self {
        Self {
            fast: HashMap::new(),
        }
    }

    fn with_fast_page(address: String, page: String) -> Self {
        let mut fast = HashMap::new();
        fast.insert(address, page);
        Self { fast }
    }
}

#[async_trait]
impl PageSourceTrait for SlowPageSource {
    async fn fetch_page(&self, address: &str) -> EngineResult<String> {
        if let Some(page) = self.fast.get(address) {
            return Ok(page.clone());
        }
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Err(EngineError::RemoteFetch {
            address: address.to_string(),
            message: "unreachable".to_string(),
        })
    }
}

// ==================== Ranking and determinism ====================

#[tokio::test]
async fn local_search_returns_ranked_results() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 5, SearchMode::Local, 0.0)
        .await
        .unwrap();

    assert!(!response.results.is_empty());
    assert!(response.results.len() <= 5);
    assert!(response.total_found >= response.results.len());
    assert!(!response.from_cache);
    assert!(!response.partial);

    for pair in response.results.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.coherence.overall_score >= b.coherence.overall_score);
        if (a.coherence.overall_score - b.coherence.overall_score).abs() < f64::EPSILON {
            assert!(a.address < b.address);
        }
    }
}

#[tokio::test]
async fn results_carry_local_provenance_and_query() {
    let (pipeline, clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    for page in &response.results {
        assert_eq!(page.source, PageSource::Local);
        assert_eq!(page.provenance.source, PageSource::Local);
        assert!(!page.provenance.normalized);
        assert_eq!(page.provenance.timestamp, clock.now());
        assert_eq!(page.query.as_deref(), Some("hello world"));
        assert_eq!(page.raw_text.len(), generator::PAGE_LENGTH);
    }
}

#[tokio::test]
async fn repeated_search_is_idempotent() {
    let (pipeline, _clock) = test_pipeline();
    let first = pipeline
        .search("hello world", 4, SearchMode::Local, 0.0)
        .await
        .unwrap();
    pipeline.cache().flush();
    let second = pipeline
        .search("hello world", 4, SearchMode::Local, 0.0)
        .await
        .unwrap();

    assert!(!second.from_cache);
    assert_eq!(ranking(&first), ranking(&second));
    assert_eq!(first.total_found, second.total_found);
}

#[tokio::test]
async fn query_normalization_unifies_requests() {
    let (pipeline, _clock) = test_pipeline();
    let plain = pipeline
        .search("hello world", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let noisy = pipeline
        .search("  HELLO\tWORLD  ", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    // same normalized query, so the second call is a cache hit
    assert!(noisy.from_cache);
    assert_eq!(ranking(&plain), ranking(&noisy));
}

// ==================== Cache behavior ====================

#[tokio::test]
async fn second_search_hits_the_cache_with_identical_results() {
    let (pipeline, _clock) = test_pipeline();
    let first = pipeline
        .search("foo", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let second = pipeline
        .search("foo", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.results, second.results);
    assert_eq!(first.total_found, second.total_found);
}

#[tokio::test]
async fn cache_expires_after_ttl_and_recomputes_equal_results() {
    let (pipeline, clock) = test_pipeline();
    let first = pipeline
        .search("foo", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    clock.advance(ChronoDuration::seconds(3601));
    let third = pipeline
        .search("foo", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    // re-executed, not served from cache, but equal modulo timestamps
    assert!(!third.from_cache);
    assert_eq!(ranking(&first), ranking(&third));
}

#[tokio::test]
async fn different_parameters_use_different_cache_entries() {
    let (pipeline, _clock) = test_pipeline();
    pipeline
        .search("foo", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let other_budget = pipeline
        .search("foo", 4, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let other_cutoff = pipeline
        .search("foo", 3, SearchMode::Local, 1.0)
        .await
        .unwrap();

    assert!(!other_budget.from_cache);
    assert!(!other_cutoff.from_cache);
}

// ==================== Boundary inputs ====================

#[tokio::test]
async fn empty_query_is_rejected() {
    let (pipeline, _clock) = test_pipeline();
    for query in ["", "   ", "\t\n"] {
        let err = pipeline
            .search(query, 5, SearchMode::Local, 0.0)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidQuery { .. }));
    }
}

#[tokio::test]
async fn sub_ngram_query_returns_empty_results() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("a", 5, SearchMode::Local, 0.0)
        .await
        .unwrap();
    assert!(response.is_empty());
    assert_eq!(response.total_found, 0);
}

#[tokio::test]
async fn zero_max_results_returns_empty() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 0, SearchMode::Local, 0.0)
        .await
        .unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn unreachable_min_score_filters_everything() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 5, SearchMode::Local, 99.9)
        .await
        .unwrap();
    assert!(response.is_empty());
    assert_eq!(response.total_found, 0);
}

#[tokio::test]
async fn min_score_is_clamped_not_rejected() {
    let (pipeline, _clock) = test_pipeline();
    let low = pipeline
        .search("hello world", 5, SearchMode::Local, -7.0)
        .await
        .unwrap();
    assert!(!low.is_empty());

    let high = pipeline
        .search("hello world", 5, SearchMode::Local, 250.0)
        .await
        .unwrap();
    assert!(high.is_empty());
}

// ==================== Remote and hybrid modes ====================

#[tokio::test]
async fn remote_mode_without_source_returns_empty() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 3, SearchMode::Remote, 0.0)
        .await
        .unwrap();
    assert!(response.is_empty());
    assert_eq!(response.total_found, 0);
}

#[tokio::test]
async fn remote_mode_serves_only_fetchable_pages() {
    let clock = ManualClock::shared();
    let config = Config::default();
    let candidates = enumerator::enumerate("hello world", 9, 2, &config.enumerator).unwrap();

    let source = StaticPageSource::new();
    let served = candidates[0].address.clone();
    source.insert(served.clone(), generator::address_to_page(&served));

    let pipeline = SearchPipeline::with_clock(config, clock)
        .unwrap()
        .with_remote_source(Arc::new(source));

    let response = pipeline
        .search("hello world", 3, SearchMode::Remote, 0.0)
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].address, served);
    assert_eq!(response.results[0].source, PageSource::Remote);
}

#[tokio::test]
async fn remote_pages_failing_validation_are_skipped() {
    let clock = ManualClock::shared();
    let config = Config::default();
    let candidates = enumerator::enumerate("hello world", 9, 2, &config.enumerator).unwrap();

    let source = StaticPageSource::new();
    source.insert(candidates[0].address.clone(), "way too short");

    let pipeline = SearchPipeline::with_clock(config, clock)
        .unwrap()
        .with_remote_source(Arc::new(source));

    let response = pipeline
        .search("hello world", 3, SearchMode::Remote, 0.0)
        .await
        .unwrap();
    assert!(response.is_empty());
}

#[tokio::test]
async fn hybrid_mode_falls_back_to_the_generator() {
    let clock = ManualClock::shared();
    let source = StaticPageSource::new();
    source.fail_everything();

    let pipeline = SearchPipeline::with_clock(Config::default(), clock.clone())
        .unwrap()
        .with_remote_source(Arc::new(source));
    let hybrid = pipeline
        .search("hello world", 3, SearchMode::Hybrid, 0.0)
        .await
        .unwrap();

    let (local_pipeline, _clock) = test_pipeline();
    let local = local_pipeline
        .search("hello world", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();

    assert_eq!(ranking(&hybrid), ranking(&local));
    assert!(hybrid
        .results
        .iter()
        .all(|p| p.source == PageSource::Local));
}

#[tokio::test]
async fn modes_occupy_distinct_cache_entries() {
    let clock = ManualClock::shared();
    let source = StaticPageSource::new();
    source.fail_everything();

    let pipeline = SearchPipeline::with_clock(Config::default(), clock)
        .unwrap()
        .with_remote_source(Arc::new(source));

    pipeline
        .search("hello world", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let hybrid = pipeline
        .search("hello world", 3, SearchMode::Hybrid, 0.0)
        .await
        .unwrap();
    assert!(!hybrid.from_cache);
}

// ==================== Deadline behavior ====================

fn one_second_deadline() -> Config {
    let mut config = Config::default();
    config.pipeline.deadline_seconds = 1;
    config
}

#[tokio::test(start_paused = true)]
async fn deadline_with_nothing_scored_is_an_error() {
    let clock = ManualClock::shared();
    let pipeline = SearchPipeline::with_clock(one_second_deadline(), clock)
        .unwrap()
        .with_remote_source(Arc::new(SlowPageSource::hang_everything()));

    let err = pipeline
        .search("hello world", 3, SearchMode::Remote, 0.0)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Deadline { .. }));
}

#[tokio::test(start_paused = true)]
async fn deadline_with_partial_results_degrades_and_skips_cache() {
    let clock = ManualClock::shared();
    let config = one_second_deadline();
    let candidates = enumerator::enumerate("hello world", 9, 2, &config.enumerator).unwrap();

    let fast = candidates[0].address.clone();
    let source = SlowPageSource::with_fast_page(fast.clone(), generator::address_to_page(&fast));

    let pipeline = SearchPipeline::with_clock(config, clock)
        .unwrap()
        .with_remote_source(Arc::new(source));

    let response = pipeline
        .search("hello world", 3, SearchMode::Remote, 0.0)
        .await
        .unwrap();
    assert!(response.partial);
    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].address, fast);

    // partial responses are never cached
    assert!(pipeline.cache().is_empty());
}

// ==================== Normalization hook and decode ====================

#[tokio::test]
async fn normalizer_rewrites_only_the_winner() {
    let clock = ManualClock::shared();
    let pipeline = SearchPipeline::with_clock(Config::default(), clock)
        .unwrap()
        .with_normalizer(Arc::new(CollapseWhitespaceNormalizer));

    let response = pipeline
        .search("hello world", 3, SearchMode::Local, 0.0)
        .await
        .unwrap();
    assert!(response.results.len() > 1);

    let winner = &response.results[0];
    assert!(winner.provenance.normalized);
    let expected: String = winner
        .raw_text
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    assert_eq!(winner.normalized_text.as_deref(), Some(expected.as_str()));

    for page in &response.results[1..] {
        assert!(!page.provenance.normalized);
        assert!(page.normalized_text.is_none());
    }
}

#[tokio::test]
async fn normalization_does_not_alter_ranking() {
    let clock = ManualClock::shared();
    let plain = SearchPipeline::with_clock(Config::default(), clock.clone()).unwrap();
    let normalized = SearchPipeline::with_clock(Config::default(), clock)
        .unwrap()
        .with_normalizer(Arc::new(CollapseWhitespaceNormalizer));

    let a = plain
        .search("hello world", 5, SearchMode::Local, 0.0)
        .await
        .unwrap();
    let b = normalized
        .search("hello world", 5, SearchMode::Local, 0.0)
        .await
        .unwrap();
    assert_eq!(ranking(&a), ranking(&b));
}

#[tokio::test]
async fn decode_scores_supplied_text() {
    let (pipeline, clock) = test_pipeline();
    let page = pipeline.decode("abcd", "xxx alpha yyy alpha zzz", Some("alpha"));

    assert_eq!(page.address, "abcd");
    assert_eq!(page.source, PageSource::Remote);
    assert_eq!(page.provenance.timestamp, clock.now());
    assert_eq!(page.coherence.exact_match_score, 75.0);
    assert_eq!(page.query.as_deref(), Some("alpha"));
}

#[tokio::test]
async fn generate_delegates_to_the_generator() {
    let (pipeline, _clock) = test_pipeline();
    assert_eq!(
        pipeline.generate("deadbeef"),
        generator::address_to_page("deadbeef")
    );
}

#[tokio::test]
async fn enumerate_delegates_with_configured_bounds() {
    let (pipeline, _clock) = test_pipeline();
    let candidates = pipeline.enumerate("hello world", 5, 2).unwrap();
    assert_eq!(candidates.len(), 5);
    assert!(candidates.iter().any(|c| c.ngrams.contains("hello")));
    assert!(candidates.iter().any(|c| c.ngrams.contains("world")));
}

// ==================== Construction ====================

#[tokio::test]
async fn invalid_config_is_rejected_at_construction() {
    let mut config = Config::default();
    config.enumerator.depth = 0;
    let err = SearchPipeline::new(config).unwrap_err();
    assert!(matches!(err, EngineError::InvalidConfig { .. }));
}

#[tokio::test]
async fn noise_pages_stay_below_medium_confidence() {
    let (pipeline, _clock) = test_pipeline();
    let response = pipeline
        .search("hello world", 5, SearchMode::Local, 0.0)
        .await
        .unwrap();

    // generated pages are alphabet noise; none should look like English
    for page in &response.results {
        assert!(matches!(
            page.coherence.confidence_level,
            ConfidenceLevel::Sparse | ConfidenceLevel::Minimal
        ));
    }
}
