//! `metaarmy settings`: persisted agent settings.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{output, CommandOutput, TableFormatter};
use crate::domain::models::AgentSettings;

#[derive(Args, Debug)]
pub struct SettingsArgs {
    #[command(subcommand)]
    pub command: SettingsCommands,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Show current settings
    Show,
    /// Change one setting
    Set {
        /// Setting name (risk_appetite, gas_limit, slippage_tolerance,
        /// auto_execute, max_swarm_size, execution_delay)
        key: String,
        /// New value
        value: String,
    },
    /// Restore defaults
    Reset,
}

#[derive(Debug, Serialize)]
pub struct SettingsOutput {
    pub message: Option<String>,
    pub settings: AgentSettings,
}

impl CommandOutput for SettingsOutput {
    fn to_human(&self) -> String {
        let table = TableFormatter::new().format_settings(&self.settings);
        match &self.message {
            Some(message) => format!("{message}\n{table}"),
            None => table,
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: SettingsArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let storage = &ctx.storage;

    let result = match args.command {
        SettingsCommands::Show => SettingsOutput {
            message: None,
            settings: storage.load_settings(),
        },
        SettingsCommands::Set { key, value } => {
            let mut settings = storage.load_settings();
            settings
                .set_field(&key, &value)
                .with_context(|| format!("Failed to update {key}"))?;
            storage
                .save_settings(&settings)
                .context("Failed to save settings")?;
            SettingsOutput {
                message: Some(format!("Updated {key}.")),
                settings,
            }
        }
        SettingsCommands::Reset => {
            storage.reset_settings().context("Failed to reset settings")?;
            SettingsOutput {
                message: Some("Settings reset to defaults.".to_string()),
                settings: AgentSettings::default(),
            }
        }
    };

    output(&result, json_mode);
    Ok(())
}
