//! Collaborator traits consumed by the pipeline.
//!
//! Remote page retrieval and text normalization are external concerns: the
//! pipeline depends only on these contracts, and tests inject the stub
//! implementations from [`crate::stubs`].

use async_trait::async_trait;

use crate::error::EngineResult;

/// An external source of pages, used in `remote` and `hybrid` modes.
///
/// # Contract
///
/// - Fallible: failures are reported per address, and the pipeline treats
///   them as skips (logged, never fatal).
/// - Bounded: the pipeline wraps each call in its configured per-call
///   timeout; implementations need not enforce one themselves.
/// - Returned text must be a well-formed page
///   ([`crate::generator::validate_page`]); the pipeline re-validates and
///   discards anything that is not.
#[async_trait]
pub trait PageSource: Send + Sync {
    /// Fetch the page behind `address`.
    async fn fetch_page(&self, address: &str) -> EngineResult<String>;
}

/// Optional text normalization capability.
///
/// When configured, the pipeline passes the top-ranked page through this
/// hook and records the output alongside the raw text; ranking is never
/// affected. Providers range from whitespace cleanup to model-backed
/// rewriting; the contract only requires determinism per input.
#[async_trait]
pub trait TextNormalizer: Send + Sync {
    /// Normalize `text`, optionally in the context of `query`.
    async fn normalize(&self, text: &str, query: Option<&str>) -> EngineResult<String>;
}
