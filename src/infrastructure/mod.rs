//! Infrastructure layer
//!
//! Adapters for the outside world: configuration, logging, credentials,
//! local storage, HTTP clients, and the dry-run bundle ledger.

pub mod config;
pub mod credentials;
pub mod explorer;
pub mod gemini;
pub mod indexer;
pub mod ledger;
pub mod logging;
pub mod storage;

pub use ledger::InMemoryBundleLedger;
