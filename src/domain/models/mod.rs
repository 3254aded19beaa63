pub mod config;
pub mod embedding;

pub use config::{Config, DimensionPolicy, EmbeddingSettings, LoggingConfig};
pub use embedding::{
    ChunkSearchResult, EmbeddingInput, EmbeddingOverrides, EmbeddingStage, EmbeddingTask,
};
