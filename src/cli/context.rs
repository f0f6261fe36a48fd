//! Wiring shared by every command.

use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::domain::models::Config;
use crate::domain::ports::{IntentResolver, LlmClient};
use crate::infrastructure::credentials::{resolve_explorer_key, resolve_gemini_key};
use crate::infrastructure::explorer::EtherscanClient;
use crate::infrastructure::gemini::{GeminiClient, GeminiClientConfig};
use crate::infrastructure::indexer::EnvioIndexerClient;
use crate::infrastructure::storage::LocalStorage;
use crate::infrastructure::InMemoryBundleLedger;
use crate::services::{AiIntentResolver, ChatService, FallbackIntentResolver, TransactionAssembler};

/// Loaded configuration plus the adapters built from it.
pub struct AppContext {
    pub config: Config,
    pub storage: LocalStorage,
    llm: Option<Arc<dyn LlmClient>>,
}

impl AppContext {
    /// Build the context. A missing or unusable AI key only disables the
    /// model-backed paths.
    pub fn new(config: Config) -> Self {
        let storage = LocalStorage::new(&config.storage.path);
        let llm = build_llm(&config, &storage);
        Self {
            config,
            storage,
            llm,
        }
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.config.ai.timeout_secs)
    }

    /// Model first, rules second. `no_ai` forces the rule-based parser.
    pub fn resolver(&self, no_ai: bool) -> FallbackIntentResolver {
        match (&self.llm, no_ai) {
            (Some(llm), false) => {
                let primary: Arc<dyn IntentResolver> =
                    Arc::new(AiIntentResolver::new(Arc::clone(llm), self.ai_timeout()));
                FallbackIntentResolver::new(Some(primary))
            }
            _ => FallbackIntentResolver::heuristic_only(),
        }
    }

    pub fn assembler(&self) -> TransactionAssembler {
        TransactionAssembler::from_config(&self.config)
    }

    /// Chat service over the dry-run ledger with the persisted settings.
    pub fn chat_service(&self, no_ai: bool) -> ChatService {
        let service = ChatService::new(
            self.resolver(no_ai),
            self.assembler(),
            Arc::new(InMemoryBundleLedger::new()),
        )
        .with_settings(self.storage.load_settings());

        match (&self.llm, no_ai) {
            (Some(llm), false) => service.with_chat_llm(Arc::clone(llm), self.ai_timeout()),
            _ => service,
        }
    }

    pub fn explorer(&self) -> Result<EtherscanClient> {
        let key = resolve_explorer_key(self.config.explorer.api_key.as_deref()).map(|k| k.value);
        if key.is_none() {
            warn!("no explorer API key configured, requests may be throttled");
        }
        EtherscanClient::new(self.config.explorer.clone(), key)
            .context("Failed to build block explorer client")
    }

    pub fn indexer(&self) -> EnvioIndexerClient {
        EnvioIndexerClient::new(&self.config.indexer)
    }
}

fn build_llm(config: &Config, storage: &LocalStorage) -> Option<Arc<dyn LlmClient>> {
    if !config.ai.enabled {
        info!("AI bridge disabled by configuration");
        return None;
    }

    let Some(key) = resolve_gemini_key(config.ai.api_key.as_deref(), Some(storage)) else {
        warn!("no Gemini API key found, using the rule-based parser only");
        return None;
    };

    match GeminiClient::new(GeminiClientConfig::from_ai_config(&config.ai, key.value)) {
        Ok(client) => {
            info!(model = %config.ai.model, source = key.source.as_str(), "AI bridge enabled");
            Some(Arc::new(client))
        }
        Err(e) => {
            warn!(error = %e, "could not build Gemini client, using the rule-based parser only");
            None
        }
    }
}
