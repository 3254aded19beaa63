//! OpenAI `/embeddings` wire types and response decoding.
//!
//! Decoding works on the status and raw body so the async and blocking
//! transports share it.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::models::embedding::{ADAPTER_KEYS, valid_dimension};

/// Effective request parameters for one call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmbeddingParameters {
    pub model: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<u32>,

    /// Caller extras forwarded verbatim
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl EmbeddingParameters {
    pub fn has_dimensions(&self) -> bool {
        self.dimensions.is_some()
    }

    /// Pull adapter-owned keys out of `extra`.
    ///
    /// A stray `dimensions` fills the typed field when that is unset, so the
    /// dimension policy and the retry see it; `model` and `input` are dropped.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for key in ADAPTER_KEYS {
            let Some(value) = self.extra.remove(key) else {
                continue;
            };
            if key == "dimensions" && self.dimensions.is_none() {
                self.dimensions = value.as_f64().and_then(valid_dimension);
            } else {
                tracing::debug!(key, "dropping adapter-owned key from extra parameters");
            }
        }
        self
    }

    /// Copy of these parameters with the dimension field removed.
    #[must_use]
    pub fn without_dimensions(&self) -> Self {
        Self {
            dimensions: None,
            ..self.clone()
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct EmbeddingsRequest<'a> {
    pub input: &'a [String],
    #[serde(flatten)]
    pub params: &'a EmbeddingParameters,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

/// Turn an HTTP exchange into vectors or an upstream error message.
///
/// Vectors are ordered by `index` when the server provides it and must
/// match `expected` in count. Provided indices must be exactly `0..expected`.
pub(crate) fn decode_response(
    status: StatusCode,
    body: &str,
    expected: usize,
) -> Result<Vec<Vec<f32>>, String> {
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorResponse>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.trim().to_string());
        return Err(format!("HTTP {status}: {detail}"));
    }

    let response: EmbeddingsResponse = serde_json::from_str(body)
        .map_err(|e| format!("Failed to parse embedding response: {e}"))?;

    if let Some(usage) = &response.usage {
        tracing::debug!(total_tokens = usage.total_tokens, "embedding request usage");
    }

    let mut data = response.data;
    if data.len() != expected {
        return Err(format!(
            "Embedding response has {} vectors for {} inputs",
            data.len(),
            expected
        ));
    }

    if data.iter().all(|d| d.index.is_some()) {
        data.sort_by_key(|d| d.index);
        if data
            .iter()
            .enumerate()
            .any(|(position, d)| d.index != Some(position))
        {
            return Err(format!(
                "Embedding response indices are not a permutation of 0..{expected}"
            ));
        }
    }

    Ok(data.into_iter().map(|d| d.embedding).collect())
}
