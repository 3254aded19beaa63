//! Embedding provider ports.
//!
//! Two traits with the same contract: an async one for callers on a
//! runtime and a blocking one for synchronous callers.

use async_trait::async_trait;

use crate::domain::errors::EmbeddingResult;
use crate::domain::models::embedding::{ChunkSearchResult, EmbeddingOverrides, EmbeddingStage};

/// Async embedding provider.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Provider name (e.g., "openai_like").
    fn name(&self) -> &'static str;

    /// Embed one text. Fails with `UnsupportedStage` for any stage the
    /// provider does not implement, before touching the network.
    async fn get_embedding(
        &self,
        text: &str,
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<f32>>;

    /// Embed an ordered batch. The result has one vector per input text.
    async fn get_embeddings(
        &self,
        texts: &[String],
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<Vec<f32>>>;

    /// Order `results` for `query` and keep at most `limit` of them.
    async fn rerank(
        &self,
        query: &str,
        results: Vec<ChunkSearchResult>,
        stage: EmbeddingStage,
        limit: usize,
    ) -> Vec<ChunkSearchResult>;
}

/// Blocking counterpart of [`EmbeddingProvider`].
///
/// Must not be called from inside an async runtime.
pub trait BlockingEmbeddingProvider: Send + Sync {
    fn get_embedding_blocking(
        &self,
        text: &str,
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<f32>>;

    fn get_embeddings_blocking(
        &self,
        texts: &[String],
        stage: EmbeddingStage,
        overrides: EmbeddingOverrides,
    ) -> EmbeddingResult<Vec<Vec<f32>>>;

    fn rerank_blocking(
        &self,
        query: &str,
        results: Vec<ChunkSearchResult>,
        stage: EmbeddingStage,
        limit: usize,
    ) -> Vec<ChunkSearchResult>;
}
