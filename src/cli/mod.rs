//! Command-line interface
//!
//! `metaarmy [--json] <command>`; every command prints through
//! [`output::CommandOutput`] so results are available as tables or JSON.

pub mod commands;
pub mod context;
pub mod output;

use clap::{Parser, Subcommand};
use console::style;

pub use context::AppContext;
pub use output::{create_spinner, MultiProgressManager, ProgressBarExt};

use commands::{
    chat::ChatArgs, history::HistoryArgs, indexer::IndexerArgs, parse::ParseArgs,
    settings::SettingsArgs,
};

#[derive(Parser, Debug)]
#[command(name = "metaarmy")]
#[command(about = "MetaArmy - natural-language DeFi agent swarms", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a request into a swarm intent
    Parse(ParseArgs),
    /// Interactive chat session with dry-run bundle submission
    Chat(ChatArgs),
    /// Transaction history from the block explorer
    History(HistoryArgs),
    /// Query the on-chain activity indexer
    Indexer(IndexerArgs),
    /// Show or change persisted agent settings
    Settings(SettingsArgs),
}

/// Report a command failure and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let chain: Vec<String> = err.chain().skip(1).map(ToString::to_string).collect();
        let payload = serde_json::json!({
            "success": false,
            "error": err.to_string(),
            "causes": chain,
        });
        println!("{payload}");
    } else {
        eprintln!("{} {err}", style("Error:").red().bold());
        for cause in err.chain().skip(1) {
            eprintln!("  {} {cause}", style("caused by:").dim());
        }
    }
    std::process::exit(1);
}
