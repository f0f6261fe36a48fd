//! LLM client port.
//!
//! Abstraction over a generative text model. The intent bridge and the
//! conversational fallback only need "prompt in, text out", so that is
//! all the port exposes.

use async_trait::async_trait;

/// Error types for LLM calls
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM not configured: {0}")]
    NotConfigured(String),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Response contained no text")]
    EmptyResponse,
}

/// Port trait for generative text models
///
/// Implementations must be `Send + Sync` so a single client can be shared
/// between sessions.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Human-readable model identifier, for logs
    fn model_name(&self) -> &str;

    /// Run one completion and return the concatenated text parts.
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
