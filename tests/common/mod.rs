//! Common test utilities for integration tests
//!
//! Builds providers pointed at a mock server and canned `/embeddings`
//! response bodies.

use std::time::Duration;

use embedlike::domain::models::config::DimensionPolicy;
use embedlike::{OpenAiLikeEmbeddingProvider, ProviderConfig};

/// Credential the mock servers expect in the bearer header.
pub const TEST_API_KEY: &str = "test-key";

/// Model name tiktoken does not know, so token counts use the heuristic.
pub const TEST_MODEL: &str = "qwen3-embedding";

/// Provider settings pointing at `base_url`.
pub fn provider_config(base_url: &str) -> ProviderConfig {
    ProviderConfig {
        base_url: base_url.trim_end_matches('/').to_string(),
        api_key: TEST_API_KEY.to_string(),
        default_model: TEST_MODEL.to_string(),
        default_dimension: None,
        max_input_tokens: 32_000,
        timeout: Duration::from_secs(5),
        dimension_policy: DimensionPolicy::Omit,
    }
}

#[allow(dead_code)]
pub fn provider(config: ProviderConfig) -> OpenAiLikeEmbeddingProvider {
    OpenAiLikeEmbeddingProvider::new(config).expect("Failed to create provider")
}

/// Provider that sends `dimensions` whenever a valid one is configured.
#[allow(dead_code)]
pub fn provider_with_dimension(base_url: &str, dimension: u32) -> OpenAiLikeEmbeddingProvider {
    provider(ProviderConfig {
        default_dimension: Some(dimension),
        dimension_policy: DimensionPolicy::IncludeWhenValid,
        ..provider_config(base_url)
    })
}

/// OpenAI-style success body with sequential indices.
#[allow(dead_code)]
pub fn embeddings_body(vectors: &[Vec<f32>]) -> String {
    let data: Vec<_> = vectors
        .iter()
        .enumerate()
        .map(|(index, embedding)| {
            serde_json::json!({
                "object": "embedding",
                "index": index,
                "embedding": embedding,
            })
        })
        .collect();

    serde_json::json!({
        "object": "list",
        "data": data,
        "model": TEST_MODEL,
        "usage": { "prompt_tokens": 4, "total_tokens": 4 }
    })
    .to_string()
}

/// OpenAI-style error body.
#[allow(dead_code)]
pub fn error_body(message: &str) -> String {
    serde_json::json!({
        "error": {
            "message": message,
            "type": "invalid_request_error"
        }
    })
    .to_string()
}

/// Error text Qwen-style servers return for `dimensions`.
#[allow(dead_code)]
pub const DIMENSION_REJECTION: &str = "model does not support dimensions parameter";
