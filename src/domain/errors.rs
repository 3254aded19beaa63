//! Domain errors for the embedding adapter.

use thiserror::Error;

use crate::domain::models::embedding::EmbeddingStage;

/// Errors surfaced to callers of an embedding provider.
///
/// Dimension rejections are recovered inside the adapter and token
/// estimation never fails, so neither has a variant here.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Unsupported embedding stage: {0}. Only the base stage is available")]
    UnsupportedStage(EmbeddingStage),

    #[error("Error getting embeddings: {0}")]
    Request(String),

    #[error("Error getting embeddings (async): {0}")]
    AsyncRequest(String),

    #[error("Invalid embedding configuration: {0}")]
    Configuration(String),
}

impl EmbeddingError {
    /// The upstream message carried by a request failure, if any.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Request(message) | Self::AsyncRequest(message) => Some(message),
            _ => None,
        }
    }

    /// Returns true if the failure happened before any network call.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::UnsupportedStage(_) | Self::Configuration(_))
    }
}

pub type EmbeddingResult<T> = Result<T, EmbeddingError>;
