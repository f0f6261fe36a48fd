//! Credentials management infrastructure
//!
//! API keys come from, in order: the loaded configuration, the
//! environment, then local storage. A missing key is not an error; the
//! caller runs with reduced functionality.

use tracing::{debug, warn};

use super::storage::LocalStorage;

/// Environment variable holding the Gemini key
pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";
/// Local storage key holding the Gemini key
pub const GEMINI_API_KEY_STORAGE: &str = "gemini_api_key";
/// Environment variable holding the explorer key
pub const ETHERSCAN_API_KEY_ENV: &str = "ETHERSCAN_API_KEY";

/// Where a resolved credential came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Config,
    Environment,
    LocalStorage,
}

impl CredentialSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Config => "config",
            Self::Environment => "environment",
            Self::LocalStorage => "local storage",
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedCredential {
    pub value: String,
    pub source: CredentialSource,
}

impl std::fmt::Debug for ResolvedCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .finish()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Resolve the Gemini API key.
pub fn resolve_gemini_key(
    configured: Option<&str>,
    storage: Option<&LocalStorage>,
) -> Option<ResolvedCredential> {
    resolve(
        configured,
        GEMINI_API_KEY_ENV,
        storage.map(|s| (s, GEMINI_API_KEY_STORAGE)),
    )
}

/// Resolve the explorer API key. Never read from local storage.
pub fn resolve_explorer_key(configured: Option<&str>) -> Option<ResolvedCredential> {
    resolve(configured, ETHERSCAN_API_KEY_ENV, None)
}

fn resolve(
    configured: Option<&str>,
    env_var: &str,
    stored: Option<(&LocalStorage, &str)>,
) -> Option<ResolvedCredential> {
    let found = non_blank(configured.map(str::to_string))
        .map(|value| (value, CredentialSource::Config))
        .or_else(|| {
            non_blank(std::env::var(env_var).ok())
                .map(|value| (value, CredentialSource::Environment))
        })
        .or_else(|| {
            let (storage, key) = stored?;
            match storage.get(key) {
                Ok(value) => non_blank(value).map(|value| (value, CredentialSource::LocalStorage)),
                Err(e) => {
                    warn!(error = %e, "could not read stored credential");
                    None
                }
            }
        });

    match found {
        Some((value, source)) => {
            debug!(env_var, source = source.as_str(), "credential resolved");
            Some(ResolvedCredential { value, source })
        }
        None => {
            debug!(env_var, "no credential configured");
            None
        }
    }
}
