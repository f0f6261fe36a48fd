use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

/// Scrubs credentials out of text before it reaches a log line
#[derive(Clone)]
pub struct SecretScrubber {
    google_key_pattern: Regex,
    query_key_pattern: Regex,
    token_pattern: Regex,
    bearer_pattern: Regex,
}

impl SecretScrubber {
    /// Create a new scrubber
    pub fn new() -> Self {
        let compile = |source: &str| Regex::new(source).expect("built-in pattern is valid");
        Self {
            // Google API keys: AIza...
            google_key_pattern: compile(r"AIza[0-9A-Za-z\-_]{20,}"),
            // Keys passed as query parameters, as Gemini and Etherscan expect
            query_key_pattern: compile(r"(?i)([?&](?:key|apikey|api_key)=)[^&\s\x22']+"),
            // Generic key/value fields
            token_pattern: compile(
                r#"(?i)(["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*)["']?[a-zA-Z0-9\-_\.]{20,}["']?"#,
            ),
            // Bearer tokens in Authorization headers
            bearer_pattern: compile(r"Bearer\s+[a-zA-Z0-9\-_\.]+"),
        }
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = self
            .query_key_pattern
            .replace_all(message, "${1}[REDACTED]");
        let scrubbed = self
            .google_key_pattern
            .replace_all(&scrubbed, "[API_KEY_REDACTED]")
            .into_owned();
        let scrubbed = self
            .bearer_pattern
            .replace_all(&scrubbed, "Bearer [TOKEN_REDACTED]")
            .into_owned();
        self.token_pattern
            .replace_all(&scrubbed, "${1}[REDACTED]")
            .into_owned()
    }
}

impl Default for SecretScrubber {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}

static SCRUBBER: Lazy<SecretScrubber> = Lazy::new(SecretScrubber::new);

/// Scrub with the shared scrubber.
pub fn scrub_secrets(message: &str) -> String {
    SCRUBBER.scrub_message(message)
}

/// Scrub only when something looks secret; avoids allocating otherwise.
pub fn scrub_if_needed(message: &str) -> Cow<'_, str> {
    let scrubbed = scrub_secrets(message);
    if scrubbed == message {
        Cow::Borrowed(message)
    } else {
        Cow::Owned(scrubbed)
    }
}
