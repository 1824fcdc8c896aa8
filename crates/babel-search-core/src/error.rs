//! Error types for babel-search-core.
//!
//! This module defines the central error type [`EngineError`] used throughout
//! the crate, along with the [`EngineResult<T>`] type alias.
//!
//! The generator, enumerator, and scorer are total functions: beyond query
//! and configuration validation they never construct an error value. The
//! pipeline is the only place where caller-visible errors originate.

use thiserror::Error;

/// Top-level error type for babel-search-core operations.
///
/// Provides structured error variants for all failure modes in the engine,
/// enabling precise error handling and informative error messages.
///
/// # Examples
///
/// ```rust
/// use babel_search_core::EngineError;
///
/// let error = EngineError::InvalidMode {
///     mode: "warp".to_string(),
/// };
/// assert!(error.to_string().contains("warp"));
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// The query normalized to an empty string.
    ///
    /// # When This Occurs
    ///
    /// - Empty query string
    /// - Query consisting only of whitespace
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected
        reason: String,
    },

    /// A configuration option is out of range.
    ///
    /// Surfaced at configuration/construction time, never during a request.
    ///
    /// # When This Occurs
    ///
    /// - N-gram bounds outside `1 ≤ min ≤ max ≤ 16`
    /// - Zero enumeration depth or result limit
    /// - Negative or all-zero scoring weights
    /// - Overfetch factor outside `[1, 10]`
    #[error("Invalid configuration: {field} - {message}")]
    InvalidConfig {
        /// Name of the offending option
        field: String,
        /// Description of the violation
        message: String,
    },

    /// The requested search mode is not recognized.
    ///
    /// Valid modes are `local`, `remote`, and `hybrid`.
    #[error("Invalid mode: {mode}")]
    InvalidMode {
        /// The unrecognized mode string
        mode: String,
    },

    /// A remote page fetch failed.
    ///
    /// The pipeline swallows this per candidate (logging the address);
    /// it is only visible to callers invoking a remote source directly.
    ///
    /// # When This Occurs
    ///
    /// - Network failure or per-call timeout
    /// - Remote content failing page validation
    #[error("Remote fetch failed for {address}: {message}")]
    RemoteFetch {
        /// Address whose fetch failed
        address: String,
        /// Description of the failure
        message: String,
    },

    /// The pipeline deadline expired before any result was scored.
    ///
    /// A deadline that expires after at least one page has been scored is
    /// degraded to a partial response instead of this error.
    #[error("Deadline exceeded after {elapsed_ms}ms with no scored results")]
    Deadline {
        /// Milliseconds elapsed when the deadline fired
        elapsed_ms: u64,
    },

    /// Error during serialization or deserialization.
    ///
    /// # When This Occurs
    ///
    /// - Cache snapshot encoding/decoding failure
    /// - Corrupted checkpoint data
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration loading failed.
    ///
    /// # When This Occurs
    ///
    /// - Missing or malformed configuration file
    /// - Environment variable parsing failure
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for EngineError {
    fn from(err: config::ConfigError) -> Self {
        EngineError::Config(err.to_string())
    }
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
