//! MetaArmy CLI entry point.

use anyhow::Context;
use clap::Parser;

use metaarmy::cli::{commands, handle_error, AppContext, Cli, Commands};
use metaarmy::infrastructure::logging::{LogConfig, LoggerImpl};
use metaarmy::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load().context("Failed to load configuration") {
        Ok(config) => config,
        Err(err) => handle_error(err, cli.json),
    };

    // Keeps the file writer alive until exit
    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => handle_error(err, cli.json),
    };

    let ctx = AppContext::new(config);

    let result = match cli.command {
        Commands::Parse(args) => commands::parse::execute(args, &ctx, cli.json).await,
        Commands::Chat(args) => commands::chat::execute(args, &ctx, cli.json).await,
        Commands::History(args) => commands::history::execute(args, &ctx, cli.json).await,
        Commands::Indexer(args) => commands::indexer::execute(args, &ctx, cli.json).await,
        Commands::Settings(args) => commands::settings::execute(args, &ctx, cli.json).await,
    };

    if let Err(err) = result {
        handle_error(err, cli.json);
    }
}
