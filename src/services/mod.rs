//! Pipeline services: classify, resolve, compose, assemble, chat.

pub mod bundle_composer;
pub mod chat_service;
pub mod intent_classifier;
pub mod intent_extractor;
pub mod intent_resolver;
pub mod transaction_assembler;

pub use bundle_composer::generate_swarm_description;
pub use chat_service::{ChatReply, ChatService};
pub use intent_classifier::{is_deployment_intent, IntentSignals};
pub use intent_extractor::extract_intent;
pub use intent_resolver::{AiIntentResolver, FallbackIntentResolver, HeuristicIntentResolver};
pub use transaction_assembler::{scale_amount, AssemblyError, TransactionAssembler};

/// Pull the JSON object out of a model reply.
///
/// Handles replies wrapped in ```json fences and replies with prose around
/// the object. Returns the trimmed input when no object is found.
pub fn extract_json_from_response(response: &str) -> String {
    let trimmed = response.trim();

    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let body_start = after_fence.find('\n').map_or(0, |i| i + 1);
        let body = &after_fence[body_start..];
        if let Some(end) = body.find("```") {
            return body[..end].trim().to_string();
        }
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => trimmed[start..=end].to_string(),
        _ => trimmed.to_string(),
    }
}
