//! Command-line interface.
//!
//! Loads layered configuration, initialises logging and drives the
//! embedding adapter. Handlers stay thin and delegate to the adapter.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{config::ConfigArgs, embed::EmbedArgs, rerank::RerankArgs};

#[derive(Parser, Debug)]
#[command(name = "embedlike")]
#[command(about = "Client for OpenAI-compatible embedding servers", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file (defaults to .embedlike/config.yaml + local.yaml)
    #[arg(short, long, global = true, env = "EMBEDLIKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed one or more texts
    Embed(EmbedArgs),

    /// Pass-through rerank: keeps the first N texts in order
    Rerank(RerankArgs),

    /// Show the resolved provider configuration
    Config(ConfigArgs),
}

/// Print an error and exit with a non-zero status
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().map(ToString::to_string).collect();
        let body = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        eprintln!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
