//! Sub-configuration structures, one per engine concern.

use serde::{Deserialize, Serialize};

use super::invalid;
use crate::error::EngineResult;
use crate::scorer::ScoringWeights;

/// Logging configuration, consumed by embedding binaries when they
/// initialize their subscriber.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            include_location: false,
        }
    }
}

/// N-gram enumeration parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct EnumeratorConfig {
    /// Smallest n-gram size extracted from the query.
    pub min_ngram: usize,
    /// Largest n-gram size extracted from the query.
    pub max_ngram: usize,
    /// Deterministic address variants emitted per n-gram.
    pub depth: u32,
    /// Default candidate list cap.
    pub max_results: usize,
}

impl Default for EnumeratorConfig {
    fn default() -> Self {
        Self {
            min_ngram: 2,
            max_ngram: 5,
            depth: 2,
            max_results: 10,
        }
    }
}

impl EnumeratorConfig {
    /// Enforce `1 <= min_ngram <= max_ngram <= 16`, `depth >= 1`,
    /// `max_results >= 1`.
    pub fn validate(&self) -> EngineResult<()> {
        if self.min_ngram < 1 {
            return Err(invalid("enumerator.min_ngram", "must be at least 1"));
        }
        if self.min_ngram > self.max_ngram {
            return Err(invalid(
                "enumerator.min_ngram",
                "must not exceed enumerator.max_ngram",
            ));
        }
        if self.max_ngram > 16 {
            return Err(invalid("enumerator.max_ngram", "must be at most 16"));
        }
        if self.depth < 1 {
            return Err(invalid("enumerator.depth", "must be at least 1"));
        }
        if self.max_results < 1 {
            return Err(invalid("enumerator.max_results", "must be at least 1"));
        }
        Ok(())
    }
}

/// Coherence scoring parameters.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: ScoringWeights,
}

impl ScoringConfig {
    pub fn validate(&self) -> EngineResult<()> {
        self.weights.validate()
    }
}

/// Result cache sizing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Entry lifetime in seconds.
    pub ttl_seconds: u64,
    /// LRU capacity in entries.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_seconds: 3600,
            max_entries: 1024,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.ttl_seconds == 0 {
            return Err(invalid("cache.ttl_seconds", "must be at least 1"));
        }
        if self.max_entries == 0 {
            return Err(invalid("cache.max_entries", "must be at least 1"));
        }
        Ok(())
    }
}

/// Pipeline orchestration parameters.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Multiplier applied to `max_results` when asking the enumerator,
    /// giving the min-score filter headroom. Bounded `[1, 10]`.
    pub overfetch_factor: f64,
    /// Upper bound on concurrent per-candidate retrieve+score tasks.
    pub concurrency_limit: usize,
    /// Whole-request deadline in seconds.
    pub deadline_seconds: u64,
    /// Per-candidate remote fetch timeout in seconds.
    pub remote_timeout_seconds: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            overfetch_factor: 3.0,
            concurrency_limit: 8,
            deadline_seconds: 15,
            remote_timeout_seconds: 5,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if !(1.0..=10.0).contains(&self.overfetch_factor) {
            return Err(invalid(
                "pipeline.overfetch_factor",
                "must lie in [1, 10]",
            ));
        }
        if self.concurrency_limit == 0 {
            return Err(invalid("pipeline.concurrency_limit", "must be at least 1"));
        }
        if self.deadline_seconds == 0 {
            return Err(invalid("pipeline.deadline_seconds", "must be at least 1"));
        }
        if self.remote_timeout_seconds == 0 {
            return Err(invalid(
                "pipeline.remote_timeout_seconds",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}
