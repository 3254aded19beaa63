//! Embedlike - embeddings from OpenAI-compatible servers
//!
//! Talks to any server exposing the OpenAI `/embeddings` endpoint, whether
//! that is OpenAI itself or a local LM Studio, vLLM or llama.cpp instance.
//! Oversized inputs are truncated to a token budget, and a request that a
//! server rejects because of `dimensions` is retried once without it.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): embedding models, configuration types, ports
//! - **Service Layer** (`services`): token budgeting and truncation
//! - **Adapters** (`adapters`): the OpenAI-compatible HTTP provider
//! - **Infrastructure Layer** (`infrastructure`): config, logging, tokenizers
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```ignore
//! use embedlike::{EmbeddingOverrides, EmbeddingProvider, EmbeddingStage};
//! use embedlike::adapters::embeddings::OpenAiLikeEmbeddingProvider;
//! use embedlike::infrastructure::config::ProcessEnv;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let provider = OpenAiLikeEmbeddingProvider::from_settings(&Default::default(), &ProcessEnv)?;
//!     let vector = provider
//!         .get_embedding("hello", EmbeddingStage::Base, EmbeddingOverrides::new())
//!         .await?;
//!     println!("{} dims", vector.len());
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use adapters::embeddings::{EmbeddingParameters, OpenAiLikeEmbeddingProvider};
pub use domain::errors::{EmbeddingError, EmbeddingResult};
pub use domain::models::{
    ChunkSearchResult, Config, DimensionPolicy, EmbeddingInput, EmbeddingOverrides,
    EmbeddingSettings, EmbeddingStage, EmbeddingTask, LoggingConfig,
};
pub use domain::ports::{BlockingEmbeddingProvider, EmbeddingProvider};
pub use infrastructure::config::{ConfigLoader, ProviderConfig};
