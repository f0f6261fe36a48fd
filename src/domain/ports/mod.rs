//! Domain ports
//!
//! Traits the services depend on and the infrastructure layer implements.

pub mod bundle_submitter;
pub mod intent_resolver;
pub mod llm_client;

pub use bundle_submitter::{BundleSubmitter, SubmissionError};
pub use intent_resolver::{IntentResolver, ResolveError};
pub use llm_client::{LlmClient, LlmError};
