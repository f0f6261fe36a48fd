//! `metaarmy history`: recent transactions from the block explorer.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::ExplorerTransaction;

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Wallet address (0x...)
    pub address: Address,

    /// Maximum number of transactions
    #[arg(short, long, default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub struct HistoryOutput {
    pub address: Address,
    pub transactions: Vec<ExplorerTransaction>,
    pub total: usize,
    pub failed: usize,
}

impl CommandOutput for HistoryOutput {
    fn to_human(&self) -> String {
        if self.transactions.is_empty() {
            return format!("No transactions found for {}.", self.address);
        }

        format!(
            "{} transaction(s) for {} ({} failed):\n{}",
            self.total,
            self.address,
            self.failed,
            TableFormatter::new().format_transactions(&self.transactions)
        )
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: HistoryArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let client = ctx.explorer()?;

    let spinner = create_spinner(format!("Fetching history for {}...", args.address), json_mode);
    let transactions = match client.transactions(args.address, Some(args.limit)).await {
        Ok(txs) => {
            spinner.finish_success(format!("{} transaction(s)", txs.len()));
            txs
        }
        Err(e) => {
            spinner.finish_error("Explorer request failed");
            return Err(e).context("Failed to fetch transaction history");
        }
    };

    let result = HistoryOutput {
        address: args.address,
        total: transactions.len(),
        failed: transactions.iter().filter(|tx| tx.failed()).count(),
        transactions,
    };
    output(&result, json_mode);
    Ok(())
}
