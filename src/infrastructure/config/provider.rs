//! Resolution of the immutable provider configuration.
//!
//! Every field is resolved once, at construction, from an ordered list of
//! sources: explicit settings, then environment variables in priority
//! order, then a hardcoded default.

use std::fmt;
use std::time::Duration;

use super::env::{first_non_empty, EnvSource};
use crate::domain::models::config::{DimensionPolicy, EmbeddingSettings};
use crate::domain::models::embedding::valid_dimension;
use crate::services::token_budget::DEFAULT_MAX_INPUT_TOKENS;

/// Endpoint variables, highest priority first.
pub const BASE_URL_VARS: [&str; 3] = ["OPENAI_API_LIKE_BASE", "OPENAI_API_BASE", "LMSTUDIO_API_BASE"];

/// Credential variables, highest priority first.
pub const API_KEY_VARS: [&str; 3] = ["OPENAI_API_LIKE_KEY", "OPENAI_API_KEY", "LMSTUDIO_API_KEY"];

pub const MAX_INPUT_TOKENS_VAR: &str = "EMBEDDING_MAX_INPUT_TOKENS";

/// `extra_fields` key consulted after the environment variable.
pub const MAX_INPUT_TOKENS_FIELD: &str = "max_input_tokens";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/v1";

/// Placeholder credential; local servers usually ignore it.
pub const DUMMY_API_KEY: &str = "dummy";

pub const DEFAULT_MODEL: &str = "embedding";

/// Settings the adapter runs with. Read-only after construction.
#[derive(Clone, PartialEq)]
pub struct ProviderConfig {
    pub base_url: String,
    pub api_key: String,
    pub default_model: String,
    pub default_dimension: Option<u32>,
    pub max_input_tokens: usize,
    pub timeout: Duration,
    pub dimension_policy: DimensionPolicy,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("default_model", &self.default_model)
            .field("default_dimension", &self.default_dimension)
            .field("max_input_tokens", &self.max_input_tokens)
            .field("timeout", &self.timeout)
            .field("dimension_policy", &self.dimension_policy)
            .finish()
    }
}

impl ProviderConfig {
    /// Resolve settings against `env`.
    pub fn resolve(settings: &EmbeddingSettings, env: &dyn EnvSource) -> Self {
        let base_url = explicit(settings.base_url.as_deref())
            .or_else(|| first_non_empty(env, &BASE_URL_VARS).map(|(_, value)| value))
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let api_key = explicit(settings.api_key.as_deref())
            .or_else(|| first_non_empty(env, &API_KEY_VARS).map(|(_, value)| value))
            .unwrap_or_else(|| DUMMY_API_KEY.to_string());

        let default_model = explicit(settings.base_model.as_deref())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let default_dimension = settings.base_dimension.and_then(valid_dimension);

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            default_model,
            default_dimension,
            max_input_tokens: resolve_max_input_tokens(settings, env),
            timeout: Duration::from_secs(settings.timeout_secs.max(1)),
            dimension_policy: settings.dimension_policy,
        }
    }

    /// Full URL of the embeddings endpoint.
    pub fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }
}

fn explicit(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

fn resolve_max_input_tokens(settings: &EmbeddingSettings, env: &dyn EnvSource) -> usize {
    if let Some((key, raw)) = first_non_empty(env, &[MAX_INPUT_TOKENS_VAR]) {
        match raw.parse::<usize>() {
            Ok(value) if value > 0 => return value,
            _ => tracing::warn!(key, value = %raw, "ignoring invalid max input tokens"),
        }
    }

    if let Some(raw) = settings.extra_fields.get(MAX_INPUT_TOKENS_FIELD) {
        let parsed = raw
            .as_u64()
            .or_else(|| raw.as_str().and_then(|s| s.trim().parse().ok()))
            .and_then(|value| usize::try_from(value).ok())
            .filter(|&value| value > 0);
        match parsed {
            Some(value) => return value,
            None => tracing::warn!(
                field = MAX_INPUT_TOKENS_FIELD,
                value = %raw,
                "ignoring invalid max input tokens"
            ),
        }
    }

    DEFAULT_MAX_INPUT_TOKENS
}
