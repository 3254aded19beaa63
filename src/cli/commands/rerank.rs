//! Implementation of the `embedlike rerank` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::adapters::embeddings::OpenAiLikeEmbeddingProvider;
use crate::cli::output::{CommandOutput, output, preview};
use crate::domain::models::config::Config;
use crate::domain::models::embedding::{ChunkSearchResult, EmbeddingStage};
use crate::domain::ports::embedding::EmbeddingProvider;
use crate::infrastructure::config::ProcessEnv;

#[derive(Args, Debug)]
pub struct RerankArgs {
    /// Query the results were retrieved for
    pub query: String,

    /// Candidate texts, in retrieval order
    pub texts: Vec<String>,

    /// Number of results to keep
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct RerankOutput {
    pub query: String,
    pub results: Vec<ChunkSearchResult>,
}

impl CommandOutput for RerankOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Kept {} result(s) for \"{}\"",
            self.results.len(),
            preview(&self.query, 60)
        )];
        lines.extend(
            self.results
                .iter()
                .map(|r| format!("  [{}] {}", r.id, preview(&r.text, 70))),
        );
        lines.join("\n")
    }
}

pub async fn execute(args: RerankArgs, config: &Config, json_mode: bool) -> Result<()> {
    let provider = OpenAiLikeEmbeddingProvider::from_settings(&config.embedding, &ProcessEnv)
        .context("Failed to construct embedding provider")?;

    let candidates = args
        .texts
        .into_iter()
        .enumerate()
        .map(|(index, text)| ChunkSearchResult::new(index.to_string(), text, 0.0))
        .collect();

    let results = provider
        .rerank(&args.query, candidates, EmbeddingStage::Rerank, args.limit)
        .await;

    output(
        &RerankOutput {
            query: args.query,
            results,
        },
        json_mode,
    );
    Ok(())
}
