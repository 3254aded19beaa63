//! Embedding provider adapters.

pub mod fallback;
pub mod openai_like;
pub mod wire;

pub use fallback::is_dimension_rejection_error;
pub use openai_like::OpenAiLikeEmbeddingProvider;
pub use wire::EmbeddingParameters;
