//! Search pipeline: enumerate → retrieve → score → rank.
//!
//! [`SearchPipeline`] binds the generator, enumerator, and scorer into a
//! single `search` operation, with a fingerprint-keyed result cache in
//! front and bounded per-candidate concurrency behind.
//!
//! # Execution
//!
//! ```text
//! query ─► fingerprint ─► cache? ──hit──► cloned results
//!                           │
//!                          miss
//!                           ▼
//!            enumerate (max_results × overfetch)
//!                           ▼
//!        per candidate, under a concurrency semaphore:
//!            retrieve page (local / remote / hybrid)
//!            score page against the query
//!                           ▼
//!        min-score filter ─► sort (score desc, address asc)
//!                           ▼
//!            truncate ─► wrap ─► cache ─► respond
//! ```
//!
//! The pipeline is reentrant; the cache is its only shared mutable state.
//! Per-candidate failures degrade gracefully (logged, skipped); the only
//! caller-visible errors are invalid queries, invalid configuration at
//! construction, and a deadline that expires before anything was scored.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Instant;

use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

use crate::cache::SearchCache;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::enumerator::{self, normalize_query};
use crate::error::{EngineError, EngineResult};
use crate::generator;
use crate::scorer::CoherenceScorer;
use crate::traits::{PageSource as PageSourceTrait, TextNormalizer};
use crate::types::{
    Candidate, CoherenceScore, DecodedPage, PageSource, SearchMode, SearchResponse,
};

/// Separator between fingerprint components; never occurs in any of them.
const FINGERPRINT_SEPARATOR: u8 = 0x1f;

/// A page retrieved and scored for one candidate address.
struct ScoredPage {
    address: String,
    text: String,
    source: PageSource,
    coherence: CoherenceScore,
}

/// The search engine: owns configuration, scorer, cache, and collaborators.
///
/// Construct with [`SearchPipeline::new`] (system clock) or
/// [`SearchPipeline::with_clock`] (injected clock), then attach optional
/// collaborators with the `with_*` builders.
pub struct SearchPipeline {
    config: Config,
    scorer: CoherenceScorer,
    cache: SearchCache,
    clock: Arc<dyn Clock>,
    remote: Option<Arc<dyn PageSourceTrait>>,
    normalizer: Option<Arc<dyn TextNormalizer>>,
    /// Digest of the result-affecting configuration, mixed into request
    /// fingerprints so config changes invalidate cached results.
    config_version: String,
}

impl std::fmt::Debug for SearchPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchPipeline")
            .field("config", &self.config)
            .field("clock", &self.clock)
            .field("remote", &self.remote.is_some())
            .field("normalizer", &self.normalizer.is_some())
            .field("config_version", &self.config_version)
            .finish()
    }
}

impl SearchPipeline {
    /// Create a pipeline over the system clock.
    ///
    /// # Errors
    ///
    /// [`EngineError::InvalidConfig`] if any option is out of range.
    pub fn new(config: Config) -> EngineResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a pipeline with an injected clock (tests, embedders with
    /// their own time source).
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> EngineResult<Self> {
        config.validate()?;
        let config_version = config_version(&config)?;
        let cache = SearchCache::new(&config.cache, clock.clone());
        let scorer = CoherenceScorer::new(config.scoring.weights);

        info!(
            config_version = %config_version,
            overfetch = config.pipeline.overfetch_factor,
            concurrency = config.pipeline.concurrency_limit,
            "search pipeline ready"
        );

        Ok(Self {
            config,
            scorer,
            cache,
            clock,
            remote: None,
            normalizer: None,
            config_version,
        })
    }

    /// Attach a remote page source for `remote`/`hybrid` modes.
    #[must_use]
    pub fn with_remote_source(mut self, source: Arc<dyn PageSourceTrait>) -> Self {
        self.remote = Some(source);
        self
    }

    /// Attach the optional normalization hook.
    #[must_use]
    pub fn with_normalizer(mut self, normalizer: Arc<dyn TextNormalizer>) -> Self {
        self.normalizer = Some(normalizer);
        self
    }

    /// Engine configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The result cache (for flush/invalidate/checkpoint by embedders).
    #[must_use]
    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Execute a search.
    ///
    /// Returns ranked [`DecodedPage`]s: overall score descending, ties by
    /// address ascending, at most `max_results` entries, all clearing
    /// `min_score`. Zero results is a legitimate outcome, not an error.
    ///
    /// # Errors
    ///
    /// - [`EngineError::InvalidQuery`] when `query` normalizes to nothing.
    /// - [`EngineError::Deadline`] when the deadline expires before any
    ///   page was scored (a later expiry degrades to a partial response).
    pub async fn search(
        &self,
        query: &str,
        max_results: usize,
        mode: SearchMode,
        min_score: f64,
    ) -> EngineResult<SearchResponse> {
        let started = Instant::now();
        let min_score = min_score.clamp(0.0, 100.0);

        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return Err(EngineError::InvalidQuery {
                reason: "normalized query is empty".to_string(),
            });
        }
        if max_results == 0 {
            return Ok(SearchResponse::empty(
                query.to_string(),
                elapsed_ms(started),
            ));
        }

        let fingerprint = self.request_fingerprint(&normalized, max_results, mode, min_score);
        if let Some(hit) = self.cache.get(&fingerprint) {
            debug!(query = %normalized, %fingerprint, "cache hit");
            return Ok(SearchResponse {
                query: query.to_string(),
                results: hit.results,
                total_found: hit.total_found,
                elapsed_ms: elapsed_ms(started),
                from_cache: true,
                partial: false,
            });
        }

        let overfetch =
            ((max_results as f64) * self.config.pipeline.overfetch_factor).ceil() as usize;
        let candidates = enumerator::enumerate(
            &normalized,
            overfetch.max(1),
            self.config.enumerator.depth,
            &self.config.enumerator,
        )?;

        if candidates.is_empty() {
            debug!(query = %normalized, "no candidates enumerated");
            return Ok(SearchResponse::empty(
                query.to_string(),
                elapsed_ms(started),
            ));
        }

        let (scored, partial) = self.retrieve_and_score(&candidates, &normalized, mode).await;
        if partial && scored.is_empty() {
            return Err(EngineError::Deadline {
                elapsed_ms: elapsed_ms(started),
            });
        }

        let mut survivors: Vec<ScoredPage> = scored
            .into_iter()
            .filter(|p| p.coherence.overall_score >= min_score)
            .collect();
        survivors.sort_by(|a, b| {
            b.coherence
                .overall_score
                .partial_cmp(&a.coherence.overall_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.address.cmp(&b.address))
        });
        let total_found = survivors.len();
        survivors.truncate(max_results);

        let now = self.clock.now();
        let mut results: Vec<DecodedPage> = survivors
            .into_iter()
            .map(|p| {
                DecodedPage::new(
                    p.address,
                    p.text,
                    Some(normalized.clone()),
                    p.source,
                    p.coherence,
                    now,
                )
            })
            .collect();

        self.normalize_winner(&mut results, &normalized).await;

        if partial {
            warn!(
                query = %normalized,
                scored = total_found,
                "deadline expired, returning partial results uncached"
            );
        } else {
            self.cache
                .put(fingerprint, results.clone(), total_found);
        }

        Ok(SearchResponse {
            query: query.to_string(),
            results,
            total_found,
            elapsed_ms: elapsed_ms(started),
            from_cache: false,
            partial,
        })
    }

    /// Materialize the page behind `address` with the local generator.
    #[must_use]
    pub fn generate(&self, address: &str) -> String {
        generator::address_to_page(address)
    }

    /// Enumerate candidate addresses for `query` without searching.
    pub fn enumerate(
        &self,
        query: &str,
        max_results: usize,
        depth: u32,
    ) -> EngineResult<Vec<Candidate>> {
        enumerator::enumerate(query, max_results, depth, &self.config.enumerator)
    }

    /// Score externally supplied page text under an address.
    ///
    /// The text is tagged [`PageSource::Remote`]: this entry point exists
    /// for pages the caller obtained elsewhere.
    #[must_use]
    pub fn decode(&self, address: &str, text: &str, query: Option<&str>) -> DecodedPage {
        let normalized = query.map(normalize_query).filter(|q| !q.is_empty());
        let coherence = self.scorer.score(text, normalized.as_deref());
        DecodedPage::new(
            address.to_string(),
            text.to_string(),
            normalized,
            PageSource::Remote,
            coherence,
            self.clock.now(),
        )
    }

    /// Fan candidate retrieval and scoring out over a bounded worker set.
    ///
    /// Returns the scored pages plus whether the deadline cut the fan-out
    /// short. Per-candidate failures are logged and skipped.
    async fn retrieve_and_score(
        &self,
        candidates: &[Candidate],
        query: &str,
        mode: SearchMode,
    ) -> (Vec<ScoredPage>, bool) {
        let semaphore = Arc::new(Semaphore::new(self.config.pipeline.concurrency_limit));
        let remote_timeout = Duration::from_secs(self.config.pipeline.remote_timeout_seconds);
        let mut tasks: JoinSet<Option<ScoredPage>> = JoinSet::new();

        for candidate in candidates {
            let semaphore = semaphore.clone();
            let scorer = self.scorer.clone();
            let remote = self.remote.clone();
            let address = candidate.address.clone();
            let query = query.to_string();

            tasks.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok()?;
                let (text, source) =
                    retrieve_page(&address, mode, remote.as_ref(), remote_timeout).await?;
                let coherence = scorer.score(&text, Some(&query));
                Some(ScoredPage {
                    address,
                    text,
                    source,
                    coherence,
                })
            });
        }

        let deadline = tokio::time::sleep(Duration::from_secs(
            self.config.pipeline.deadline_seconds,
        ));
        tokio::pin!(deadline);

        let mut scored = Vec::with_capacity(candidates.len());
        let mut partial = false;

        loop {
            tokio::select! {
                () = &mut deadline => {
                    tasks.abort_all();
                    partial = true;
                    break;
                }
                joined = tasks.join_next() => match joined {
                    None => break,
                    Some(Ok(Some(page))) => scored.push(page),
                    Some(Ok(None)) => {}
                    Some(Err(err)) if err.is_cancelled() => {}
                    Some(Err(err)) => warn!(error = %err, "candidate task panicked"),
                },
            }
        }

        (scored, partial)
    }

    /// Run the normalization hook over the top-ranked result, if both
    /// exist. Hook failures are logged and ignored.
    async fn normalize_winner(&self, results: &mut [DecodedPage], query: &str) {
        let Some(normalizer) = &self.normalizer else {
            return;
        };
        let Some(winner) = results.first_mut() else {
            return;
        };

        match normalizer.normalize(&winner.raw_text, Some(query)).await {
            Ok(text) => {
                winner.normalized_text = Some(text);
                winner.provenance.normalized = true;
            }
            Err(err) => {
                warn!(address = %winner.address, error = %err, "normalization hook failed");
            }
        }
    }

    /// Stable fingerprint of a request over the normalized query, result
    /// budget, mode, score cutoff, and configuration version.
    fn request_fingerprint(
        &self,
        normalized_query: &str,
        max_results: usize,
        mode: SearchMode,
        min_score: f64,
    ) -> String {
        let mut hasher = Sha256::new();
        for part in [
            normalized_query.as_bytes(),
            max_results.to_string().as_bytes(),
            mode.as_str().as_bytes(),
            &min_score.to_bits().to_be_bytes()[..],
            self.config_version.as_bytes(),
        ] {
            hasher.update(part);
            hasher.update([FINGERPRINT_SEPARATOR]);
        }
        generator::hex_lower(&hasher.finalize())
    }
}

/// Obtain a page for one candidate according to the search mode.
///
/// Returns `None` when the candidate should be skipped (remote failure in
/// `remote` mode); `hybrid` falls back to the generator instead.
async fn retrieve_page(
    address: &str,
    mode: SearchMode,
    remote: Option<&Arc<dyn PageSourceTrait>>,
    remote_timeout: Duration,
) -> Option<(String, PageSource)> {
    match mode {
        SearchMode::Local => Some((generator::address_to_page(address), PageSource::Local)),
        SearchMode::Remote => fetch_remote(address, remote, remote_timeout).await,
        SearchMode::Hybrid => match fetch_remote(address, remote, remote_timeout).await {
            Some(found) => Some(found),
            None => {
                debug!(address, "hybrid fallback to local generator");
                Some((generator::address_to_page(address), PageSource::Local))
            }
        },
    }
}

/// Fetch and validate one remote page; `None` on any failure (logged).
async fn fetch_remote(
    address: &str,
    remote: Option<&Arc<dyn PageSourceTrait>>,
    remote_timeout: Duration,
) -> Option<(String, PageSource)> {
    let Some(source) = remote else {
        warn!(address, "remote mode requested but no page source configured");
        return None;
    };

    match timeout(remote_timeout, source.fetch_page(address)).await {
        Ok(Ok(page)) => match generator::validate_page(&page) {
            Ok(()) => Some((page, PageSource::Remote)),
            Err(defect) => {
                warn!(address, %defect, "remote page failed validation, skipping");
                None
            }
        },
        Ok(Err(err)) => {
            warn!(address, error = %err, "remote fetch failed, skipping");
            None
        }
        Err(_) => {
            warn!(address, "remote fetch timed out, skipping");
            None
        }
    }
}

/// Digest of the configuration sections that affect search results.
fn config_version(config: &Config) -> EngineResult<String> {
    let relevant = serde_json::to_string(&(
        &config.enumerator,
        &config.scoring,
        config.pipeline.overfetch_factor,
    ))?;
    let digest = Sha256::digest(relevant.as_bytes());
    let mut version = generator::hex_lower(&digest);
    version.truncate(16);
    Ok(version)
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
