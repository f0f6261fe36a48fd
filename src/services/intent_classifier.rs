//! Deployment-vs-chat classification.
//!
//! A keyword heuristic. It answers "does this look like a request to set
//! something up on-chain?" and nothing more; false positives and negatives
//! are expected and there is no confidence score.

use once_cell::sync::Lazy;
use regex::Regex;

static STRONG_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\b(swap|invest|stake|deploy|buy|sell|lend|borrow|transfer|automate|set up|setup|create|execute|provide|supply|deposit|withdraw|farm|snipe|vote|rebalance|dca)\b",
    )
    .expect("built-in pattern is valid")
});

static PROTOCOL_MENTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(aave|uniswap|lido|compound|yearn|curve|usdc|eth|dai|weth)\b")
        .expect("built-in pattern is valid")
});

static AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\$\s*\d+(?:[.,]\d+)*|\b\d+(?:[.,]\d+)*\s*(?:usdc|eth|dai|weth|usdt|usd|dollars?)\b",
    )
    .expect("built-in pattern is valid")
});

/// Signals found in one piece of text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntentSignals {
    pub strong_verb: bool,
    pub protocol_mention: bool,
    pub amount: bool,
}

impl IntentSignals {
    pub fn scan(text: &str) -> Self {
        let lower = text.to_lowercase();
        Self {
            strong_verb: STRONG_VERB.is_match(&lower),
            protocol_mention: PROTOCOL_MENTION.is_match(&lower),
            amount: AMOUNT.is_match(&lower),
        }
    }

    pub fn is_deployment(&self) -> bool {
        (self.strong_verb && (self.protocol_mention || self.amount))
            || (self.amount && self.protocol_mention)
    }
}

/// Decide whether `text` is a deployment request. Never fails.
pub fn is_deployment_intent(text: &str) -> bool {
    IntentSignals::scan(text).is_deployment()
}
