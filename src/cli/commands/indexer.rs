//! `metaarmy indexer`: tables from the on-chain activity indexer.
//!
//! Indexer failures never surface as errors; an unreachable endpoint looks
//! the same as an account with no history.

use alloy_primitives::Address;
use anyhow::Result;
use clap::{Args, Subcommand};
use indicatif::ProgressBar;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{
    create_spinner, output, CommandOutput, MultiProgressManager, ProgressBarExt, TableFormatter,
};
use crate::domain::models::{Permission, PortfolioSnapshot, UserActivity, YieldPool};

#[derive(Args, Debug)]
pub struct IndexerArgs {
    #[command(subcommand)]
    pub command: IndexerCommands,
}

#[derive(Subcommand, Debug)]
pub enum IndexerCommands {
    /// Recent activity for a wallet
    Activities {
        address: Address,
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Active delegated permissions for a wallet
    Permissions { address: Address },
    /// Portfolio value snapshots for a wallet
    Portfolio {
        address: Address,
        #[arg(short, long, default_value = "30")]
        limit: usize,
    },
    /// Yield pools ordered by APY
    Pools {
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// All four views at once
    Dashboard {
        address: Address,
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
}

#[derive(Debug, Default, Serialize)]
pub struct IndexerOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activities: Option<Vec<UserActivity>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<Vec<Permission>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<Vec<PortfolioSnapshot>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pools: Option<Vec<YieldPool>>,
}

impl CommandOutput for IndexerOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut sections = Vec::new();

        if let Some(rows) = &self.activities {
            sections.push(section("Activity", rows.len(), || formatter.format_activities(rows)));
        }
        if let Some(rows) = &self.permissions {
            sections.push(section("Permissions", rows.len(), || {
                formatter.format_permissions(rows)
            }));
        }
        if let Some(rows) = &self.portfolio {
            sections.push(section("Portfolio", rows.len(), || formatter.format_portfolio(rows)));
        }
        if let Some(rows) = &self.pools {
            sections.push(section("Yield pools", rows.len(), || formatter.format_pools(rows)));
        }

        sections.join("\n\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn section(title: &str, count: usize, render: impl FnOnce() -> String) -> String {
    if count == 0 {
        format!("{title}: no records")
    } else {
        format!("{title} ({count}):\n{}", render())
    }
}

fn finish(spinner: &ProgressBar, label: &str, count: usize) {
    if count == 0 {
        spinner.finish_warning(format!("{label}: no records"));
    } else {
        spinner.finish_success(format!("{label}: {count}"));
    }
}

pub async fn execute(args: IndexerArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let client = ctx.indexer();

    let result = match args.command {
        IndexerCommands::Activities { address, limit } => {
            let spinner = create_spinner("Loading activity...", json_mode);
            let rows = client.user_activities(address, limit).await;
            finish(&spinner, "Activity", rows.len());
            IndexerOutput {
                activities: Some(rows),
                ..IndexerOutput::default()
            }
        }
        IndexerCommands::Permissions { address } => {
            let spinner = create_spinner("Loading permissions...", json_mode);
            let rows = client.permissions(address).await;
            finish(&spinner, "Permissions", rows.len());
            IndexerOutput {
                permissions: Some(rows),
                ..IndexerOutput::default()
            }
        }
        IndexerCommands::Portfolio { address, limit } => {
            let spinner = create_spinner("Loading portfolio...", json_mode);
            let rows = client.portfolio_snapshots(address, limit).await;
            finish(&spinner, "Portfolio", rows.len());
            IndexerOutput {
                portfolio: Some(rows),
                ..IndexerOutput::default()
            }
        }
        IndexerCommands::Pools { limit } => {
            let spinner = create_spinner("Loading yield pools...", json_mode);
            let rows = client.yield_pools(limit).await;
            finish(&spinner, "Yield pools", rows.len());
            IndexerOutput {
                pools: Some(rows),
                ..IndexerOutput::default()
            }
        }
        IndexerCommands::Dashboard { address, limit } => {
            let progress = MultiProgressManager::new(json_mode);
            let activity_spinner = progress.add_spinner("Activity");
            let permission_spinner = progress.add_spinner("Permissions");
            let portfolio_spinner = progress.add_spinner("Portfolio");
            let pool_spinner = progress.add_spinner("Yield pools");

            // Each query degrades on its own, so none waits on another
            let (activities, permissions, portfolio, pools) = futures::join!(
                async {
                    let rows = client.user_activities(address, limit).await;
                    finish(&activity_spinner, "Activity", rows.len());
                    rows
                },
                async {
                    let rows = client.permissions(address).await;
                    finish(&permission_spinner, "Permissions", rows.len());
                    rows
                },
                async {
                    let rows = client.portfolio_snapshots(address, limit).await;
                    finish(&portfolio_spinner, "Portfolio", rows.len());
                    rows
                },
                async {
                    let rows = client.yield_pools(limit).await;
                    finish(&pool_spinner, "Yield pools", rows.len());
                    rows
                },
            );
            progress.clear();

            IndexerOutput {
                activities: Some(activities),
                permissions: Some(permissions),
                portfolio: Some(portfolio),
                pools: Some(pools),
            }
        }
    };

    output(&result, json_mode);
    Ok(())
}
