//! Configuration management for the search engine.
//!
//! The page alphabet and page length are compile-time constants in
//! [`crate::generator`] and are deliberately absent here: they are part of
//! the page format, not tunable behavior.

mod sub_configs;


use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::types::SearchMode;

pub use sub_configs::{
    CacheConfig, EnumeratorConfig, LoggingConfig, PipelineConfig, ScoringConfig,
};

/// Main configuration structure.
///
/// Every section has working defaults, so a missing file or a partial
/// TOML document yields a usable engine.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Mode used when a caller does not pick one explicitly.
    pub mode_default: SearchMode,
    pub logging: LoggingConfig,
    pub enumerator: EnumeratorConfig,
    pub scoring: ScoringConfig,
    pub cache: CacheConfig,
    pub pipeline: PipelineConfig,
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Sources are layered in order:
    /// 1. `config/default.toml` (base settings)
    /// 2. `config/{BABEL_ENV}.toml` (environment-specific)
    /// 3. Environment variables with the `BABEL` prefix
    ///    (`BABEL__CACHE__TTL_SECONDS=60`)
    pub fn load() -> EngineResult<Self> {
        let env = std::env::var("BABEL_ENV").unwrap_or_else(|_| "development".to_string());

        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(config::Environment::with_prefix("BABEL").separator("__"));

        let config: Config = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &std::path::Path) -> EngineResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            EngineError::Config(format!("failed to read config file {}: {e}", path.display()))
        })?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| EngineError::Config(format!("failed to parse config file: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate every section.
    ///
    /// Returns [`EngineError::InvalidConfig`] naming the first offending
    /// field. Called at load time and by the pipeline constructor, so an
    /// out-of-range option can never surface mid-request.
    pub fn validate(&self) -> EngineResult<()> {
        self.enumerator.validate()?;
        self.scoring.validate()?;
        self.cache.validate()?;
        self.pipeline.validate()?;
        Ok(())
    }
}

/// Shorthand for an [`EngineError::InvalidConfig`].
pub(crate) fn invalid(field: &str, message: impl Into<String>) -> EngineError {
    EngineError::InvalidConfig {
        field: field.to_string(),
        message: message.into(),
    }
}
