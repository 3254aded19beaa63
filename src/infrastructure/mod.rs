//! Infrastructure layer module
//!
//! - Configuration loading and provider resolution
//! - Logging infrastructure
//! - tiktoken-backed token counting

pub mod config;
pub mod logging;
pub mod tokenizer;
