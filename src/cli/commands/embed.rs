//! Implementation of the `embedlike embed` command.

use anyhow::{Context, Result, bail};
use clap::Args;
use serde::Serialize;
use std::io::BufRead;

use crate::adapters::embeddings::OpenAiLikeEmbeddingProvider;
use crate::cli::output::{CommandOutput, output, preview};
use crate::domain::models::config::Config;
use crate::domain::models::embedding::{EmbeddingOverrides, EmbeddingStage};
use crate::domain::ports::embedding::EmbeddingProvider;
use crate::infrastructure::config::ProcessEnv;

#[derive(Args, Debug)]
pub struct EmbedArgs {
    /// Texts to embed, in order
    pub texts: Vec<String>,

    /// Also read newline-separated texts from stdin
    #[arg(long)]
    pub stdin: bool,

    /// Model override for this call
    #[arg(short, long)]
    pub model: Option<String>,

    /// Requested output dimensions
    #[arg(short, long)]
    pub dimensions: Option<f64>,

    /// Extra request parameter as key=value (value parsed as JSON when possible)
    #[arg(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, serde_json::Value)>,
}

fn parse_key_value(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got `{raw}`"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty parameter name in `{raw}`"));
    }
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[derive(Debug, Serialize)]
pub struct EmbeddingRow {
    pub index: usize,
    pub text: String,
    pub dimension: usize,
    pub embedding: Vec<f32>,
}

#[derive(Debug, Serialize)]
pub struct EmbedOutput {
    pub model: String,
    pub embeddings: Vec<EmbeddingRow>,
}

impl CommandOutput for EmbedOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Model: {} ({} embedding(s))",
            self.model,
            self.embeddings.len()
        )];
        for row in &self.embeddings {
            let head: Vec<String> = row
                .embedding
                .iter()
                .take(4)
                .map(|v| format!("{v:.4}"))
                .collect();
            lines.push(format!(
                "  [{}] {:>5} dims  {:<40}  [{}{}]",
                row.index,
                row.dimension,
                preview(&row.text, 40),
                head.join(", "),
                if row.dimension > head.len() { ", ..." } else { "" },
            ));
        }
        lines.join("\n")
    }
}

fn collect_texts(args: &EmbedArgs) -> Result<Vec<String>> {
    let mut texts = args.texts.clone();
    if args.stdin {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("Failed to read stdin")?;
            if !line.trim().is_empty() {
                texts.push(line);
            }
        }
    }
    if texts.is_empty() {
        bail!("No input texts. Pass them as arguments or use --stdin");
    }
    Ok(texts)
}

fn overrides_from(args: &EmbedArgs) -> EmbeddingOverrides {
    let mut overrides = EmbeddingOverrides::new();
    if let Some(model) = &args.model {
        overrides = overrides.with_model(model.clone());
    }
    if let Some(dimensions) = args.dimensions {
        overrides = overrides.with_dimensions(dimensions);
    }
    for (key, value) in &args.params {
        overrides = overrides.with_param(key.clone(), value.clone());
    }
    overrides
}

pub async fn execute(args: EmbedArgs, config: &Config, json_mode: bool) -> Result<()> {
    let texts = collect_texts(&args)?;
    let overrides = overrides_from(&args);

    let provider = OpenAiLikeEmbeddingProvider::from_settings(&config.embedding, &ProcessEnv)
        .context("Failed to construct embedding provider")?;
    let model = provider.build_request_parameters(overrides.clone()).model;

    let vectors = provider
        .get_embeddings(&texts, EmbeddingStage::Base, overrides)
        .await
        .context("Embedding request failed")?;

    let embeddings = texts
        .into_iter()
        .zip(vectors)
        .enumerate()
        .map(|(index, (text, embedding))| EmbeddingRow {
            index,
            text,
            dimension: embedding.len(),
            embedding,
        })
        .collect();

    output(&EmbedOutput { model, embeddings }, json_mode);
    Ok(())
}
