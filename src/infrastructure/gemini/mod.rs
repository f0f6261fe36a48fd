//! Google Gemini client
//!
//! Implements the [`LlmClient`](crate::domain::ports::LlmClient) port over
//! the REST `generateContent` endpoint.

pub mod client;
pub mod types;

pub use client::{GeminiClient, GeminiClientConfig};
