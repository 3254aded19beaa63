//! Embedlike CLI entry point.

use anyhow::Context;
use clap::Parser;

use embedlike::cli::{Cli, Commands, commands, handle_error};
use embedlike::infrastructure::config::ConfigLoader;
use embedlike::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    };
    let config = match config {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    let logger = match LoggerImpl::init(&LogConfig::from(&config.logging))
        .context("Failed to initialize logging")
    {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Embed(args) => commands::embed::execute(args, &config, cli.json).await,
        Commands::Rerank(args) => commands::rerank::execute(args, &config, cli.json).await,
        Commands::Config(args) => commands::config::execute(args, &config, cli.json),
    };

    if let Err(err) = result {
        // Flush buffered file output before exiting.
        drop(logger);
        handle_error(err, cli.json);
    }
}
