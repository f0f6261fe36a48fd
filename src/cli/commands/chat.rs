//! `metaarmy chat`: line-oriented chat session on stdin.
//!
//! Plain lines go to the assistant. Slash commands drive the pending
//! swarm: `/confirm`, `/cancel`, `/execute`, `/status`, `/quit`.

use alloy_primitives::Address;
use anyhow::{Context, Result};
use clap::Args;
use console::style;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use crate::cli::context::AppContext;
use crate::cli::output::{create_spinner, output, CommandOutput, TableFormatter};
use crate::domain::models::{BundleReceipt, ChatSession, Notice, NoticeLevel};
use crate::services::{ChatReply, ChatService};

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Wallet address used as the bundle owner
    #[arg(short, long)]
    pub wallet: Option<Address>,

    /// Skip the AI bridge and use the rule-based parser
    #[arg(long)]
    pub no_ai: bool,
}

/// One line of input, classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatInput {
    Message(String),
    Confirm,
    Cancel,
    Execute,
    Status,
    Help,
    Quit,
    Empty,
    Unknown(String),
}

impl ChatInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Self::Empty;
        }
        let Some(command) = line.strip_prefix('/') else {
            return Self::Message(line.to_string());
        };
        match command.to_lowercase().as_str() {
            "confirm" | "yes" => Self::Confirm,
            "cancel" | "no" => Self::Cancel,
            "execute" => Self::Execute,
            "status" => Self::Status,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            _ => Self::Unknown(line.to_string()),
        }
    }
}

const HELP: &str = "Commands: /confirm  /cancel  /execute  /status  /help  /quit";

/// Everything the chat loop prints.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ChatEvent {
    Reply(ChatReply),
    Submitted {
        receipt: BundleReceipt,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        notices: Vec<Notice>,
    },
    Notice(Notice),
    Info { message: String },
}

impl CommandOutput for ChatEvent {
    fn to_human(&self) -> String {
        match self {
            Self::Reply(ChatReply::Conversation { text }) => text.clone(),
            Self::Reply(ChatReply::Proposal {
                description,
                intent,
            }) => format!(
                "{description}\n{}\nType /confirm to deploy or /cancel to discard.",
                TableFormatter::new().format_tasks(&intent.tasks)
            ),
            Self::Submitted { receipt, notices } => {
                let mut text = format!(
                    "{} Swarm bundle {} created with {} action(s).",
                    style("✓").green(),
                    receipt.bundle_id,
                    receipt.total_actions
                );
                for notice in notices {
                    text.push('\n');
                    text.push_str(&format_notice(notice));
                }
                text
            }
            Self::Notice(notice) => format_notice(notice),
            Self::Info { message } => message.clone(),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

fn format_notice(notice: &Notice) -> String {
    let marker = match notice.level {
        NoticeLevel::Error => style("✗").red(),
        NoticeLevel::Success => style("✓").green(),
        NoticeLevel::Info => style("i").cyan(),
    };
    format!("{marker} {}: {}", notice.title, notice.message)
}

/// Apply one input to the session. `None` ends the loop.
pub async fn step(
    service: &ChatService,
    session: &mut ChatSession,
    input: ChatInput,
    json_mode: bool,
) -> Option<ChatEvent> {
    let event = match input {
        ChatInput::Quit => return None,
        ChatInput::Empty => ChatEvent::Info {
            message: String::new(),
        },
        ChatInput::Help => ChatEvent::Info {
            message: HELP.to_string(),
        },
        ChatInput::Unknown(command) => ChatEvent::Info {
            message: format!("Unknown command {command}. {HELP}"),
        },
        ChatInput::Status => ChatEvent::Info {
            message: format!("Session state: {}", session.pending.as_str()),
        },
        ChatInput::Message(text) => {
            let spinner = create_spinner("Thinking...", json_mode);
            let reply = service.handle_message(session, &text).await;
            spinner.finish_and_clear();
            ChatEvent::Reply(reply)
        }
        ChatInput::Confirm => {
            let spinner = create_spinner("Submitting swarm bundle...", json_mode);
            let result = service.confirm(session).await;
            spinner.finish_and_clear();
            match result {
                Ok(receipt) => ChatEvent::Submitted {
                    receipt,
                    notices: session.take_notices(),
                },
                Err(notice) => ChatEvent::Notice(notice),
            }
        }
        ChatInput::Execute => match service.execute(session).await {
            Ok(()) => ChatEvent::Notice(Notice::success(
                "Executed",
                "All bundle actions were executed.",
            )),
            Err(notice) => ChatEvent::Notice(notice),
        },
        ChatInput::Cancel => ChatEvent::Info {
            message: if service.cancel(session) {
                "Swarm discarded.".to_string()
            } else {
                "Nothing to cancel.".to_string()
            },
        },
    };
    Some(event)
}

pub async fn execute(args: ChatArgs, ctx: &AppContext, json_mode: bool) -> Result<()> {
    let service = ctx.chat_service(args.no_ai);
    let mut session = ChatSession::new(args.wallet);
    debug!(session_id = %session.id, wallet = ?args.wallet, "chat session started");

    if !json_mode {
        println!("MetaArmy chat. {HELP}");
        if args.wallet.is_none() {
            println!("No wallet given; proposals can be reviewed but not confirmed.");
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read from stdin")? {
        let input = ChatInput::parse(&line);
        if input == ChatInput::Empty {
            continue;
        }
        match step(&service, &mut session, input, json_mode).await {
            Some(event) => output(&event, json_mode),
            None => break,
        }
    }

    debug!(session_id = %session.id, messages = session.messages.len(), "chat session ended");
    Ok(())
}
