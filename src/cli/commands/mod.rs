pub mod config;
pub mod embed;
pub mod rerank;
