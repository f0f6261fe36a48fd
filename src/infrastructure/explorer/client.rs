use alloy_primitives::Address;
use reqwest::Client as ReqwestClient;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::errors::ExplorerError;
use super::rate_limiter::TokenBucketRateLimiter;
use crate::domain::models::{ExplorerConfig, ExplorerEnvelope, ExplorerTransaction};
use crate::infrastructure::logging::scrub_secrets;

const NO_TRANSACTIONS: &str = "no transactions found";
const DEPRECATED: &str = "deprecated";

/// Which route a request went through
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route {
    Primary,
    Fallback,
}

/// Outcome of reading one envelope
enum Interpreted {
    Transactions(Vec<ExplorerTransaction>),
    Deprecated,
}

/// Etherscan-compatible `account/txlist` client
///
/// Requests go through a token bucket. A deprecated-endpoint answer from
/// the primary route is retried exactly once against the fallback route;
/// nothing else is retried.
pub struct EtherscanClient {
    http_client: ReqwestClient,
    config: ExplorerConfig,
    api_key: Option<String>,
    rate_limiter: TokenBucketRateLimiter,
}

impl EtherscanClient {
    pub fn new(config: ExplorerConfig, api_key: Option<String>) -> Result<Self, ExplorerError> {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ExplorerError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: TokenBucketRateLimiter::new(config.requests_per_second),
            config,
            api_key,
        })
    }

    /// Transactions for `address`, newest first.
    #[instrument(skip(self), fields(address = %address))]
    pub async fn transactions(
        &self,
        address: Address,
        limit: Option<usize>,
    ) -> Result<Vec<ExplorerTransaction>, ExplorerError> {
        match self.fetch(Route::Primary, address, limit).await? {
            Interpreted::Transactions(txs) => Ok(txs),
            Interpreted::Deprecated => {
                let Some(fallback) = &self.config.fallback_url else {
                    return Err(ExplorerError::Deprecated);
                };
                info!(fallback = %fallback, "primary explorer route deprecated, retrying once on fallback");
                match self.fetch(Route::Fallback, address, limit).await? {
                    Interpreted::Transactions(txs) => Ok(txs),
                    Interpreted::Deprecated => Err(ExplorerError::Deprecated),
                }
            }
        }
    }

    fn query(&self, route: Route, address: Address, limit: Option<usize>) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("module", "account".to_string()),
            ("action", "txlist".to_string()),
            ("address", address.to_string()),
            ("startblock", "0".to_string()),
            ("endblock", "99999999".to_string()),
            ("sort", "desc".to_string()),
        ];
        if let Some(limit) = limit {
            query.push(("page", "1".to_string()));
            query.push(("offset", limit.to_string()));
        }
        // The legacy per-network route has no chainid parameter
        if route == Route::Primary {
            if let Some(chain_id) = self.config.chain_id {
                query.push(("chainid", chain_id.to_string()));
            }
        }
        if let Some(key) = &self.api_key {
            query.push(("apikey", key.clone()));
        }
        query
    }

    async fn fetch(
        &self,
        route: Route,
        address: Address,
        limit: Option<usize>,
    ) -> Result<Interpreted, ExplorerError> {
        let url = match route {
            Route::Primary => self.config.base_url.as_str(),
            Route::Fallback => self
                .config
                .fallback_url
                .as_deref()
                .ok_or(ExplorerError::Deprecated)?,
        };

        self.rate_limiter.acquire().await;
        debug!(?route, "querying explorer");

        let response = self
            .http_client
            .get(url)
            .query(&self.query(route, address, limit))
            .send()
            .await
            .map_err(|e| self.network_error(e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), ?route, "explorer returned an HTTP error");
            return Err(ExplorerError::Http(status.as_u16()));
        }

        let envelope: ExplorerEnvelope = response
            .json()
            .await
            .map_err(|e| ExplorerError::Decode(scrub_secrets(&e.without_url().to_string())))?;

        Self::interpret(envelope)
    }

    fn interpret(envelope: ExplorerEnvelope) -> Result<Interpreted, ExplorerError> {
        let detail = match &envelope.result {
            serde_json::Value::String(s) => s.clone(),
            _ => String::new(),
        };

        if envelope.status == "1" {
            let txs = serde_json::from_value(envelope.result)
                .map_err(|e| ExplorerError::Decode(e.to_string()))?;
            return Ok(Interpreted::Transactions(txs));
        }

        let message = envelope.message.to_lowercase();
        if message.contains(NO_TRANSACTIONS) || detail.to_lowercase().contains(NO_TRANSACTIONS) {
            return Ok(Interpreted::Transactions(Vec::new()));
        }
        if message.contains(DEPRECATED) || detail.to_lowercase().contains(DEPRECATED) {
            return Ok(Interpreted::Deprecated);
        }

        Err(ExplorerError::Api {
            message: envelope.message,
            detail: scrub_secrets(&detail),
        })
    }

    fn network_error(&self, err: reqwest::Error) -> ExplorerError {
        if err.is_timeout() {
            ExplorerError::Timeout(self.config.timeout_secs)
        } else {
            ExplorerError::Network(scrub_secrets(&err.without_url().to_string()))
        }
    }
}
