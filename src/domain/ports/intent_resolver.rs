//! Intent resolver port.

use async_trait::async_trait;

use super::llm_client::LlmError;
use crate::domain::models::SwarmIntent;

#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("Could not parse model output: {0}")]
    Parse(String),

    #[error("Model returned no tasks")]
    NoTasks,
}

/// Turns free text into a structured swarm intent.
///
/// Two strategies exist (model-backed and rule-based); the fallback
/// resolver composes them.
#[async_trait]
pub trait IntentResolver: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    async fn resolve(&self, text: &str) -> Result<SwarmIntent, ResolveError>;
}
