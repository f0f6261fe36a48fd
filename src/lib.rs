//! MetaArmy - natural-language DeFi agent swarms
//!
//! Turns requests like "invest 50 USDC in Aave and vote on proposal 1"
//! into a structured swarm intent, describes it, and assembles the
//! on-chain actions for a single swarm bundle.
//!
//! # Architecture
//!
//! - **Domain Layer** (`domain`): intent, chain and session models plus the ports
//! - **Service Layer** (`services`): classify, resolve, compose, assemble, chat
//! - **Infrastructure Layer** (`infrastructure`): config, logging, HTTP clients, storage
//! - **CLI Layer** (`cli`): command-line interface
//!
//! # Example
//!
//! ```
//! use metaarmy::services::{extract_intent, generate_swarm_description};
//!
//! let intent = extract_intent("invest 50 USDC in Aave and vote on proposal 1");
//! assert_eq!(intent.task_count(), 2);
//! assert!(generate_swarm_description(&intent).contains("2"));
//! ```

pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Action, AgentSettings, ChainAction, ChatSession, Config, Priority, SwarmIntent, Task,
};
pub use domain::ports::{BundleSubmitter, IntentResolver, LlmClient};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{
    extract_intent, generate_swarm_description, is_deployment_intent, ChatService,
    FallbackIntentResolver, TransactionAssembler,
};
