//! Babel Search Core Library
//!
//! A coherence-driven retrieval engine over the deterministic "Babel space":
//! the conceptual universe of all 29^3200 pages writable with the 29-symbol
//! alphabet `{' ', ',', '.', 'a'..'z'}`.
//!
//! # Architecture
//!
//! ```text
//! Query ──► Enumerator ──► [addresses] ──► Generator (per address)
//!                                              │
//!                                              ▼
//!          ranked results ◄── rank & cut ◄── Scorer (per page, query)
//! ```
//!
//! This crate provides:
//! - The page generator: a pure address → 3200-char page function
//!   ([`generator`])
//! - The query enumerator: deterministic n-gram fragment addressing
//!   ([`enumerator`])
//! - The coherence scorer: four weighted sub-metrics with bucketed
//!   confidence ([`scorer`])
//! - The search pipeline binding them together with a TTL/LRU cache
//!   ([`pipeline`], [`cache`])
//! - Error types, configuration structures, and an injectable clock
//!
//! The generator, enumerator, and scorer are pure and reentrant; the
//! pipeline is the only component holding mutable state (the cache).
//!
//! # Example
//!
//! ```
//! use babel_search_core::generator;
//!
//! let page = generator::address_to_page("deadbeef");
//! assert_eq!(page.chars().count(), generator::PAGE_LENGTH);
//! assert!(generator::validate_page(&page).is_ok());
//! ```

pub mod cache;
pub mod clock;
pub mod config;
pub mod enumerator;
pub mod error;
pub mod generator;
pub mod pipeline;
pub mod scorer;
pub mod stubs;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use cache::SearchCache;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::Config;
pub use error::{EngineError, EngineResult};
pub use pipeline::SearchPipeline;
pub use scorer::{CoherenceScorer, ScoringWeights};
pub use types::{
    CacheEntry, Candidate, CoherenceScore, ConfidenceLevel, DecodedPage, PageSource, Provenance,
    SearchMode, SearchResponse,
};
