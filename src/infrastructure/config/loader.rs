use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use thiserror::Error;

use super::provider::MAX_INPUT_TOKENS_FIELD;
use crate::domain::models::config::Config;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Unsupported embedding provider: {0}. Only openai_like is available")]
    UnsupportedProvider(String),

    #[error("Invalid timeout_secs: {0}. Must be at least 1")]
    InvalidTimeout(u64),

    #[error("Invalid max_input_tokens: {0}. Must be a positive integer")]
    InvalidMaxInputTokens(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .embedlike/config.yaml (project config)
    /// 3. .embedlike/local.yaml (local overrides, optional)
    /// 4. Environment variables (EMBEDLIKE_* prefix, highest priority)
    ///
    /// Provider endpoint and credential discovery (`OPENAI_API_BASE` and
    /// friends) happens later, when the provider is constructed.
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".embedlike/config.yaml"))
            .merge(Yaml::file(".embedlike/local.yaml"))
            .merge(Env::prefixed("EMBEDLIKE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring `EMBEDLIKE_*` overrides
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed("EMBEDLIKE_").split("__"))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let embedding = &config.embedding;
        if embedding.provider != "openai_like" {
            return Err(ConfigError::UnsupportedProvider(embedding.provider.clone()));
        }

        if embedding.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(embedding.timeout_secs));
        }

        if let Some(raw) = embedding.extra_fields.get(MAX_INPUT_TOKENS_FIELD) {
            let parsed = raw
                .as_u64()
                .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()));
            if !parsed.is_some_and(|value| value > 0) {
                return Err(ConfigError::InvalidMaxInputTokens(raw.to_string()));
            }
        }

        Ok(())
    }
}
