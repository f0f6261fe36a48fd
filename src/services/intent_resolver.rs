//! Intent resolution strategies.
//!
//! - [`HeuristicIntentResolver`]: the rule-based extractor, never fails
//! - [`AiIntentResolver`]: asks a generative model for structured JSON
//! - [`FallbackIntentResolver`]: tries the model first, falls back to the
//!   rules on any failure

use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::extract_json_from_response;
use super::intent_extractor::{extract_intent, DEFAULT_AMOUNT, DEFAULT_ASSET, DEFAULT_PROTOCOL};
use crate::domain::models::{Action, Priority, SwarmIntent, Task};
use crate::domain::ports::{IntentResolver, LlmClient, LlmError, ResolveError};

/// Rule-based resolver.
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicIntentResolver;

impl HeuristicIntentResolver {
    pub fn parse(&self, text: &str) -> SwarmIntent {
        extract_intent(text)
    }
}

#[async_trait]
impl IntentResolver for HeuristicIntentResolver {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    async fn resolve(&self, text: &str) -> Result<SwarmIntent, ResolveError> {
        Ok(self.parse(text))
    }
}

/// Model-backed resolver.
pub struct AiIntentResolver {
    llm: Arc<dyn LlmClient>,
    timeout: Duration,
}

impl AiIntentResolver {
    pub fn new(llm: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self { llm, timeout }
    }

    /// Build the extraction prompt for one user message.
    pub fn build_prompt(text: &str) -> String {
        format!(
            r#"You are the intent parser for a DeFi automation assistant.
Break the user's request into atomic on-chain tasks.

## User Request
{text}

## Allowed Values
- action: invest, swap, yield, rebalance, snipe, vote, post, dca
- asset: USDC, ETH, DAI, WETH, USDT
- target: protocol name, e.g. Aave, Uniswap, Lido, Compound, Yearn, Curve
- priority: speed, efficiency, cost

## Output Format
Respond with ONLY valid JSON, no prose:

```json
{{
  "goal": "one-sentence restatement of what the user wants",
  "isBundle": true,
  "priority": "efficiency",
  "tasks": [
    {{
      "action": "invest",
      "asset": "USDC",
      "target": "Aave",
      "amount": "50",
      "condition": "only if APY is above 4%",
      "requiresZk": false
    }}
  ]
}}
```

Set requiresZk to true only when the user asks for privacy, security or ZK verification.
Use one task per distinct action. Amounts are plain decimal strings without units."#
        )
    }

    /// Parse the model reply, filling gaps with rule-based defaults.
    pub fn parse_response(text: &str, response: &str) -> Result<SwarmIntent, ResolveError> {
        let json = extract_json_from_response(response);
        let payload: AiIntentPayload =
            serde_json::from_str(&json).map_err(|e| ResolveError::Parse(e.to_string()))?;

        if payload.tasks.is_empty() {
            return Err(ResolveError::NoTasks);
        }

        let tasks = payload
            .tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| task.into_task(index + 1))
            .collect();

        let goal = payload
            .goal
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| text.trim().to_string());

        let priority = payload
            .priority
            .as_deref()
            .and_then(Priority::from_str)
            .unwrap_or_default();

        Ok(SwarmIntent::new(goal, tasks, priority))
    }
}

#[async_trait]
impl IntentResolver for AiIntentResolver {
    fn name(&self) -> &'static str {
        "ai"
    }

    async fn resolve(&self, text: &str) -> Result<SwarmIntent, ResolveError> {
        let prompt = Self::build_prompt(text);
        debug!(model = self.llm.model_name(), "requesting structured intent");

        let response = tokio::time::timeout(self.timeout, self.llm.generate(&prompt))
            .await
            .map_err(|_| LlmError::Timeout(self.timeout.as_secs()))??;

        Self::parse_response(text, &response)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiIntentPayload {
    #[serde(default)]
    goal: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    tasks: Vec<AiTaskPayload>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AiTaskPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    asset: Option<String>,
    #[serde(default)]
    target: Option<String>,
    #[serde(default)]
    amount: Option<serde_json::Value>,
    #[serde(default, alias = "conditions")]
    condition: Option<serde_json::Value>,
    #[serde(default, alias = "requiresZK", alias = "requires_zk", alias = "zk")]
    requires_zk: Option<bool>,
}

impl AiTaskPayload {
    fn into_task(self, id: usize) -> Task {
        let non_empty = |value: Option<String>| {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let amount = match self.amount {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
            Some(serde_json::Value::Number(n)) => n.to_string(),
            _ => DEFAULT_AMOUNT.to_string(),
        };

        let conditions = match self.condition {
            Some(serde_json::Value::String(s)) => vec![s],
            Some(serde_json::Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        }
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("none"))
        .collect();

        Task {
            id,
            action: self
                .action
                .as_deref()
                .and_then(Action::from_str)
                .unwrap_or_default(),
            asset: non_empty(self.asset)
                .map_or_else(|| DEFAULT_ASSET.to_string(), |a| a.to_uppercase()),
            target: non_empty(self.target).unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            amount,
            conditions,
            requires_zk: self.requires_zk.unwrap_or(false),
            target_address: None,
        }
    }
}

/// Tries the model-backed resolver first and the rules second.
///
/// Falls back only on failure; a successful model answer is used as is.
pub struct FallbackIntentResolver {
    primary: Option<Arc<dyn IntentResolver>>,
    fallback: HeuristicIntentResolver,
}

impl FallbackIntentResolver {
    pub fn new(primary: Option<Arc<dyn IntentResolver>>) -> Self {
        Self {
            primary,
            fallback: HeuristicIntentResolver,
        }
    }

    /// Rules only.
    pub fn heuristic_only() -> Self {
        Self::new(None)
    }

    pub fn has_primary(&self) -> bool {
        self.primary.is_some()
    }

    /// Resolve text into an intent. Never fails.
    pub async fn resolve_intent(&self, text: &str) -> SwarmIntent {
        if let Some(primary) = &self.primary {
            match primary.resolve(text).await {
                Ok(intent) => return intent,
                Err(err) => warn!(
                    resolver = primary.name(),
                    error = %err,
                    "intent resolver failed, using rule-based parser"
                ),
            }
        }
        self.fallback.parse(text)
    }
}

#[async_trait]
impl IntentResolver for FallbackIntentResolver {
    fn name(&self) -> &'static str {
        "fallback"
    }

    async fn resolve(&self, text: &str) -> Result<SwarmIntent, ResolveError> {
        Ok(self.resolve_intent(text).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        fn model_name(&self) -> &str {
            "failing"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Err(LlmError::Network("connection refused".to_string()))
        }
    }

    struct CannedLlm(&'static str);

    #[async_trait]
    impl LlmClient for CannedLlm {
        fn model_name(&self) -> &str {
            "canned"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct SlowLlm;

    #[async_trait]
    impl LlmClient for SlowLlm {
        fn model_name(&self) -> &str {
            "slow"
        }

        async fn generate(&self, _prompt: &str) -> Result<String, LlmError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok("{}".to_string())
        }
    }

    fn ai(llm: impl LlmClient + 'static) -> Arc<dyn IntentResolver> {
        Arc::new(AiIntentResolver::new(Arc::new(llm), Duration::from_millis(200)))
    }

    #[test]
    fn test_prompt_contains_request() {
        let prompt = AiIntentResolver::build_prompt("swap 5 ETH");
        assert!(prompt.contains("swap 5 ETH"));
        assert!(prompt.contains("\"requiresZk\""));
    }

    #[test]
    fn test_parse_fenced_response() {
        let response = r#"Sure!
```json
{"goal": "Earn yield", "isBundle": false, "priority": "cost",
 "tasks": [{"action": "yield", "asset": "dai", "target": "Yearn", "amount": 250, "condition": "none", "requiresZk": true}]}
```"#;
        let intent = AiIntentResolver::parse_response("farm dai", response).unwrap();
        assert_eq!(intent.goal, "Earn yield");
        assert_eq!(intent.priority, Priority::Cost);
        let task = &intent.tasks[0];
        assert_eq!(task.action, Action::Yield);
        assert_eq!(task.asset, "DAI");
        assert_eq!(task.amount, "250");
        assert!(task.conditions.is_empty());
        assert!(task.requires_zk);
    }

    #[test]
    fn test_parse_fills_missing_fields() {
        let response = r#"{"tasks": [{"action": "teleport"}, {"action": "vote", "conditions": ["on proposal 4"]}]}"#;
        let intent = AiIntentResolver::parse_response("do things", response).unwrap();
        assert_eq!(intent.goal, "do things");
        assert_eq!(intent.priority, Priority::Efficiency);
        assert!(intent.is_bundle());
        assert_eq!(intent.tasks[0].action, Action::Invest);
        assert_eq!(intent.tasks[0].amount, DEFAULT_AMOUNT);
        assert_eq!(intent.tasks[0].target, DEFAULT_PROTOCOL);
        assert_eq!(intent.tasks[1].conditions, vec!["on proposal 4".to_string()]);
    }

    #[test]
    fn test_parse_rejects_garbage_and_empty_tasks() {
        assert!(matches!(
            AiIntentResolver::parse_response("x", "I cannot help with that"),
            Err(ResolveError::Parse(_))
        ));
        assert!(matches!(
            AiIntentResolver::parse_response("x", r#"{"tasks": []}"#),
            Err(ResolveError::NoTasks)
        ));
    }

    #[tokio::test]
    async fn test_network_failure_falls_back_to_rules() {
        let resolver = FallbackIntentResolver::new(Some(ai(FailingLlm)));
        let intent = resolver.resolve_intent("invest 50 USDC and vote on proposal 1").await;
        assert_eq!(intent.tasks.len(), 2);
        assert_eq!(intent.tasks[0].action, Action::Invest);
        assert_eq!(intent.tasks[1].action, Action::Vote);
    }

    #[tokio::test]
    async fn test_malformed_model_output_falls_back() {
        let resolver = FallbackIntentResolver::new(Some(ai(CannedLlm("not json at all"))));
        let intent = resolver.resolve_intent("swap 100 USDC for ETH").await;
        assert_eq!(intent.tasks[0].action, Action::Swap);
        assert_eq!(intent.tasks[0].amount, "100");
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let resolver = FallbackIntentResolver::new(Some(ai(SlowLlm)));
        let intent = resolver.resolve_intent("stake 2 ETH on lido").await;
        assert_eq!(intent.tasks[0].target, "Lido");
        assert_eq!(intent.tasks[0].amount, "2");
    }

    #[tokio::test]
    async fn test_successful_model_answer_is_used() {
        let resolver = FallbackIntentResolver::new(Some(ai(CannedLlm(
            r#"{"goal": "Swap to ETH", "tasks": [{"action": "swap", "asset": "USDC", "target": "Uniswap", "amount": "100"}]}"#,
        ))));
        let intent = resolver.resolve_intent("swap 100 USDC for ETH").await;
        assert_eq!(intent.goal, "Swap to ETH");
        assert_eq!(intent.tasks[0].target, "Uniswap");
    }

    #[test]
    fn test_heuristic_only_resolver_blocks_on() {
        let resolver = FallbackIntentResolver::heuristic_only();
        assert!(!resolver.has_primary());
        let intent = tokio_test::block_on(resolver.resolve("hello"));
        assert!(intent.is_ok());
    }
}
