//! `metaarmy parse`: classify, resolve and describe one request.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput, ProgressBarExt, TableFormatter};
use crate::domain::models::{ChainAction, SwarmIntent};
use crate::services::{generate_swarm_description, IntentSignals};

#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Natural-language request, e.g. "invest 50 USDC in Aave"
    #[arg(required = true, num_args = 1..)]
    pub text: Vec<String>,

    /// Also build the on-chain actions for the bundle
    #[arg(short, long)]
    pub assemble: bool,

    /// Skip the AI bridge and use the rule-based parser
    #[arg(long)]
    pub no_ai: bool,
}

#[derive(Debug, Serialize)]
pub struct ParseOutput {
    pub is_deployment: bool,
    pub signals: SignalsOutput,
    pub description: String,
    pub intent: SwarmIntent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<ChainAction>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assembly_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SignalsOutput {
    pub strong_verb: bool,
    pub protocol_mention: bool,
    pub amount: bool,
}

impl From<IntentSignals> for SignalsOutput {
    fn from(signals: IntentSignals) -> Self {
        Self {
            strong_verb: signals.strong_verb,
            protocol_mention: signals.protocol_mention,
            amount: signals.amount,
        }
    }
}

impl CommandOutput for ParseOutput {
    fn to_human(&self) -> String {
        let formatter = TableFormatter::new();
        let mut lines = vec![
            format!(
                "Deployment intent: {}",
                if self.is_deployment { "yes" } else { "no" }
            ),
            format!("Goal: {}", self.intent.goal),
            format!("Priority: {}", self.intent.priority),
            String::new(),
            self.description.clone(),
        ];

        if !self.intent.is_empty() {
            lines.push(String::new());
            lines.push(formatter.format_tasks(&self.intent.tasks));
        }

        if let Some(actions) = &self.actions {
            lines.push(String::new());
            lines.push("On-chain actions:".to_string());
            lines.push(formatter.format_chain_actions(actions));
        }
        if let Some(err) = &self.assembly_error {
            lines.push(String::new());
            lines.push(format!("Could not build transaction: {err}"));
        }

        lines.join("\n")
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: ParseArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let text = args.text.join(" ");
    let signals = IntentSignals::scan(&text);

    let resolver = ctx.resolver(args.no_ai);
    let spinner = create_spinner("Resolving intent...", json_mode);
    let intent = resolver.resolve_intent(&text).await;
    spinner.finish_success(format!("{} task(s) found", intent.task_count()));

    let (actions, assembly_error) = if args.assemble {
        match ctx.assembler().assemble(&intent) {
            Ok(actions) => (Some(actions), None),
            Err(e) => (None, Some(e.to_string())),
        }
    } else {
        (None, None)
    };

    let result = ParseOutput {
        is_deployment: signals.is_deployment(),
        signals: signals.into(),
        description: generate_swarm_description(&intent),
        intent,
        actions,
        assembly_error,
    };
    output(&result, json_mode);
    Ok(())
}
