//! Table output formatting for CLI commands
//!
//! Renders intents, chain actions, explorer history, indexer records and
//! settings with comfy-table.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use super::truncate;
use crate::domain::models::{
    AgentSettings, ChainAction, ExplorerTransaction, Permission, PortfolioSnapshot, Task,
    UserActivity, YieldPool,
};

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self {
            use_colors,
            max_width,
        }
    }

    fn create_base_table(&self, headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic);
        if let Some(width) = self.max_width {
            table.set_width(width);
        }
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        table
    }

    fn flag_cell(&self, on: bool, label: &str) -> Cell {
        match (on, self.use_colors) {
            (true, true) => Cell::new(label).fg(Color::Magenta),
            (true, false) => Cell::new(label),
            (false, _) => Cell::new("-"),
        }
    }

    pub fn format_tasks(&self, tasks: &[Task]) -> String {
        let mut table =
            self.create_base_table(&["#", "Action", "Amount", "Asset", "Target", "Conditions", "ZK"]);
        for task in tasks {
            let conditions = if task.conditions.is_empty() {
                "-".to_string()
            } else {
                task.conditions.join(", ")
            };
            table.add_row(vec![
                Cell::new(task.id),
                Cell::new(task.action.as_str()),
                Cell::new(&task.amount),
                Cell::new(&task.asset),
                Cell::new(&task.target),
                Cell::new(truncate(&conditions, 40)),
                self.flag_cell(task.requires_zk, "zk"),
            ]);
        }
        table.to_string()
    }

    pub fn format_chain_actions(&self, actions: &[ChainAction]) -> String {
        let mut table = self.create_base_table(&["#", "Target", "Amount (base units)", "Data", "ZK"]);
        for (index, action) in actions.iter().enumerate() {
            let target = Cell::new(action.target.to_string());
            let target = if self.use_colors && action.target.is_zero() {
                target.fg(Color::Red)
            } else {
                target
            };
            table.add_row(vec![
                Cell::new(index + 1),
                target,
                Cell::new(action.amount.to_string()),
                Cell::new(action.data.to_string()),
                self.flag_cell(action.requires_zk, "zk"),
            ]);
        }
        table.to_string()
    }

    pub fn format_transactions(&self, txs: &[ExplorerTransaction]) -> String {
        let mut table = self.create_base_table(&["Time", "Hash", "To", "Method", "Value (wei)", "Status"]);
        for tx in txs {
            let time = tx
                .timestamp()
                .map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string());
            let status = match (tx.failed(), self.use_colors) {
                (true, true) => Cell::new("failed").fg(Color::Red),
                (true, false) => Cell::new("✗ failed"),
                (false, true) => Cell::new("ok").fg(Color::Green),
                (false, false) => Cell::new("✓ ok"),
            };
            table.add_row(vec![
                Cell::new(time),
                Cell::new(truncate(&tx.hash, 14)),
                Cell::new(truncate(&tx.to, 14)),
                Cell::new(tx.method_selector().unwrap_or("-")),
                Cell::new(&tx.value),
                status,
            ]);
        }
        table.to_string()
    }

    pub fn format_activities(&self, rows: &[UserActivity]) -> String {
        let mut table =
            self.create_base_table(&["Time", "Type", "Protocol", "Token", "Amount", "Tx"]);
        for row in rows {
            table.add_row(vec![
                Cell::new(&row.timestamp),
                Cell::new(&row.activity_type),
                Cell::new(row.protocol.as_deref().unwrap_or("-")),
                Cell::new(row.token.as_deref().unwrap_or("-")),
                Cell::new(&row.amount),
                Cell::new(truncate(&row.tx_hash, 14)),
            ]);
        }
        table.to_string()
    }

    pub fn format_permissions(&self, rows: &[Permission]) -> String {
        let mut table =
            self.create_base_table(&["Delegate", "Token", "Allowance", "Period (s)", "Expires", "Active"]);
        for row in rows {
            table.add_row(vec![
                Cell::new(truncate(&row.delegate, 14)),
                Cell::new(row.token.as_deref().unwrap_or("-")),
                Cell::new(&row.allowance),
                Cell::new(row.period.as_deref().unwrap_or("-")),
                Cell::new(row.expires_at.as_deref().unwrap_or("-")),
                self.flag_cell(row.active, "yes"),
            ]);
        }
        table.to_string()
    }

    pub fn format_portfolio(&self, rows: &[PortfolioSnapshot]) -> String {
        let mut table = self.create_base_table(&["Time", "Total value (USD)"]);
        for row in rows {
            table.add_row(vec![Cell::new(&row.timestamp), Cell::new(&row.total_value_usd)]);
        }
        table.to_string()
    }

    pub fn format_pools(&self, rows: &[YieldPool]) -> String {
        let mut table = self.create_base_table(&["Protocol", "Asset", "APY %", "TVL"]);
        for row in rows {
            let apy = row
                .apy_percent()
                .map_or_else(|| row.apy.clone(), |apy| format!("{apy:.2}"));
            table.add_row(vec![
                Cell::new(&row.protocol),
                Cell::new(&row.asset),
                Cell::new(apy),
                Cell::new(&row.tvl),
            ]);
        }
        table.to_string()
    }

    pub fn format_settings(&self, settings: &AgentSettings) -> String {
        let mut table = self.create_base_table(&["Setting", "Value"]);
        let rows = [
            ("risk_appetite", settings.risk_appetite.as_str().to_string()),
            ("gas_limit", settings.gas_limit.to_string()),
            ("slippage_tolerance", format!("{}%", settings.slippage_tolerance)),
            ("auto_execute", settings.auto_execute.to_string()),
            ("max_swarm_size", settings.max_swarm_size.to_string()),
            ("execution_delay", format!("{}s", settings.execution_delay)),
        ];
        for (name, value) in rows {
            table.add_row(vec![Cell::new(name), Cell::new(value)]);
        }
        table.to_string()
    }
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

/// Check if color output is supported
fn supports_color() -> bool {
    // Respect NO_COLOR environment variable
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    if let Ok(term) = env::var("TERM") {
        if term == "dumb" {
            return false;
        }
    }

    console::colors_enabled()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::extract_intent;

    fn plain() -> TableFormatter {
        TableFormatter::with_config(false, Some(120))
    }

    #[test]
    fn test_task_table_lists_every_task() {
        let intent = extract_intent("invest 50 USDC in aave and vote on proposal 1 privately");
        let rendered = plain().format_tasks(&intent.tasks);
        assert!(rendered.contains("invest"));
        assert!(rendered.contains("vote"));
        assert!(rendered.contains("zk"));
    }

    #[test]
    fn test_settings_table() {
        let rendered = plain().format_settings(&AgentSettings::default());
        assert!(rendered.contains("max_swarm_size"));
        assert!(rendered.contains("balanced"));
    }

    #[test]
    fn test_pool_apy_formatting() {
        let pools = vec![YieldPool {
            id: "1".to_string(),
            protocol: "Aave".to_string(),
            asset: "USDC".to_string(),
            apy: "4.1234".to_string(),
            tvl: "1000000".to_string(),
        }];
        assert!(plain().format_pools(&pools).contains("4.12"));
    }
}
