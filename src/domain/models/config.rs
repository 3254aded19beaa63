use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Main configuration structure for embedlike
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Embedding provider configuration
    #[serde(default)]
    pub embedding: EmbeddingSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// How the `dimensions` request field is treated when building parameters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionPolicy {
    /// Never send `dimensions`; many compatible servers reject it outright.
    #[default]
    Omit,
    /// Send `dimensions` when one resolves to a valid value.
    IncludeWhenValid,
}

/// Embedding provider settings as written in config files.
///
/// Unset endpoint and credential fields are discovered from the
/// environment when the provider is constructed.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct EmbeddingSettings {
    /// Provider identifier; only `openai_like` is implemented
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Default model sent when a call does not override it
    #[serde(default)]
    pub base_model: Option<String>,

    /// Default output dimension; NaN is read as unset
    #[serde(default)]
    pub base_dimension: Option<f64>,

    /// Explicit endpoint, wins over every environment variable
    #[serde(default)]
    pub base_url: Option<String>,

    /// Explicit credential, wins over every environment variable
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub dimension_policy: DimensionPolicy,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Free-form provider extras (e.g. `max_input_tokens`)
    #[serde(default)]
    pub extra_fields: BTreeMap<String, serde_json::Value>,
}

fn default_provider() -> String {
    "openai_like".to_string()
}

const fn default_timeout_secs() -> u64 {
    60
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            base_model: None,
            base_dimension: None,
            base_url: None,
            api_key: None,
            dimension_policy: DimensionPolicy::default(),
            timeout_secs: default_timeout_secs(),
            extra_fields: BTreeMap::new(),
        }
    }
}
