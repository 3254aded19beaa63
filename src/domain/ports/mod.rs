//! Port trait definitions (Hexagonal Architecture)
//!
//! - `EmbeddingProvider`: async embedding and rerank operations
//! - `BlockingEmbeddingProvider`: the same operations for synchronous callers

pub mod embedding;

pub use embedding::{BlockingEmbeddingProvider, EmbeddingProvider};
