//! Domain layer
//!
//! Embedding models, configuration types and the provider port. Nothing in
//! here talks to the network or reads the environment.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{EmbeddingError, EmbeddingResult};
