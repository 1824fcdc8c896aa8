//! In-memory collaborator implementations.
//!
//! These back the pipeline's remote and normalization seams in tests and
//! demos. They are real implementations of the trait contracts (not
//! mocks), just without any network or model behind them.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::{EngineError, EngineResult};
use crate::traits::{PageSource, TextNormalizer};

/// Preloaded address → page map acting as a remote page source.
///
/// Addresses that were never loaded fail with
/// [`EngineError::RemoteFetch`], which is exactly how the pipeline
/// exercises its per-candidate skip path.
#[derive(Debug, Default)]
pub struct StaticPageSource {
    pages: RwLock<HashMap<String, String>>,
    /// When set, every fetch fails regardless of contents.
    fail_all: RwLock<bool>,
}

impl StaticPageSource {
    /// Create an empty source (every fetch fails).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a page under an address.
    pub fn insert(&self, address: impl Into<String>, page: impl Into<String>) {
        self.pages.write().insert(address.into(), page.into());
    }

    /// Make every subsequent fetch fail, simulating a dead remote.
    pub fn fail_everything(&self) {
        *self.fail_all.write() = true;
    }

    /// Number of loaded pages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.read().len()
    }

    /// Whether no pages are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.read().is_empty()
    }
}

#[async_trait]
impl PageSource for StaticPageSource {
    async fn fetch_page(&self, address: &str) -> EngineResult<String> {
        if *self.fail_all.read() {
            return Err(EngineError::RemoteFetch {
                address: address.to_string(),
                message: "source unavailable".to_string(),
            });
        }
        self.pages
            .read()
            .get(address)
            .cloned()
            .ok_or_else(|| EngineError::RemoteFetch {
                address: address.to_string(),
                message: "no such page".to_string(),
            })
    }
}

/// Whitespace-collapsing normalizer.
///
/// The non-model normalization the system ships with: runs of whitespace
/// become single spaces, outer whitespace is trimmed.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollapseWhitespaceNormalizer;

#[async_trait]
impl TextNormalizer for CollapseWhitespaceNormalizer {
    async fn normalize(&self, text: &str, _query: Option<&str>) -> EngineResult<String> {
        Ok(text.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}
