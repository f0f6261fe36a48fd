//! CLI command implementations.

pub mod chat;
pub mod history;
pub mod indexer;
pub mod parse;
pub mod settings;
