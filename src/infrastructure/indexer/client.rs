use alloy_primitives::Address;
use reqwest::Client as ReqwestClient;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, warn};

use super::errors::IndexerError;
use super::queries;
use crate::domain::models::{IndexerConfig, Permission, PortfolioSnapshot, UserActivity, YieldPool};

#[derive(Debug, Serialize)]
struct GraphQlRequest<'a> {
    query: &'a str,
    variables: Value,
}

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    #[serde(default)]
    message: String,
}

/// Client for the Envio GraphQL indexer
///
/// Every query degrades to an empty list on any failure, with one warning
/// per failed query. Callers never see an error.
pub struct EnvioIndexerClient {
    http_client: ReqwestClient,
    endpoint: String,
}

impl EnvioIndexerClient {
    pub fn new(config: &IndexerConfig) -> Self {
        let http_client = ReqwestClient::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "failed to build indexer HTTP client, using defaults");
                ReqwestClient::new()
            });

        Self {
            http_client,
            endpoint: config.endpoint.clone(),
        }
    }

    pub async fn user_activities(&self, user: Address, limit: usize) -> Vec<UserActivity> {
        self.query_list(
            queries::USER_ACTIVITIES,
            json!({"user": indexer_address(user), "limit": limit}),
            queries::USER_ACTIVITIES_FIELD,
        )
        .await
    }

    pub async fn permissions(&self, user: Address) -> Vec<Permission> {
        self.query_list(
            queries::PERMISSIONS,
            json!({"user": indexer_address(user)}),
            queries::PERMISSIONS_FIELD,
        )
        .await
    }

    pub async fn portfolio_snapshots(&self, user: Address, limit: usize) -> Vec<PortfolioSnapshot> {
        self.query_list(
            queries::PORTFOLIO_SNAPSHOTS,
            json!({"user": indexer_address(user), "limit": limit}),
            queries::PORTFOLIO_SNAPSHOTS_FIELD,
        )
        .await
    }

    pub async fn yield_pools(&self, limit: usize) -> Vec<YieldPool> {
        self.query_list(
            queries::YIELD_POOLS,
            json!({"limit": limit}),
            queries::YIELD_POOLS_FIELD,
        )
        .await
    }

    async fn query_list<T: DeserializeOwned>(&self, query: &str, variables: Value, field: &str) -> Vec<T> {
        match self.execute(query, variables, field).await {
            Ok(rows) => {
                debug!(field, rows = rows.len(), "indexer query succeeded");
                rows
            }
            Err(err) => {
                warn!(field, error = %err, "indexer query failed, returning no rows");
                Vec::new()
            }
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        field: &str,
    ) -> Result<Vec<T>, IndexerError> {
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&GraphQlRequest { query, variables })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexerError::Http(status.as_u16()));
        }

        let body: GraphQlResponse = response.json().await?;

        if let Some(errors) = body.errors.filter(|errors| !errors.is_empty()) {
            let messages: Vec<_> = errors.into_iter().map(|e| e.message).collect();
            return Err(IndexerError::GraphQl(messages.join("; ")));
        }

        let rows = body
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .ok_or_else(|| IndexerError::MissingField(field.to_string()))?;

        serde_json::from_value(rows).map_err(|e| IndexerError::Decode(e.to_string()))
    }
}

/// The indexer stores addresses lowercased.
fn indexer_address(address: Address) -> String {
    address.to_string().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indexer_address_is_lowercase() {
        let address = Address::repeat_byte(0xAB);
        assert_eq!(indexer_address(address), format!("0x{}", "ab".repeat(20)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_degrades_to_empty() {
        let client = EnvioIndexerClient::new(&IndexerConfig {
            endpoint: "http://127.0.0.1:9/v1/graphql".to_string(),
            timeout_secs: 1,
        });
        assert!(client.yield_pools(5).await.is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let client = EnvioIndexerClient::new(&IndexerConfig {
            endpoint: "http://127.0.0.1:9/v1/graphql".to_string(),
            timeout_secs: 1,
        });
        let result: Result<Vec<YieldPool>, _> = client
            .execute(queries::YIELD_POOLS, json!({"limit": 1}), queries::YIELD_POOLS_FIELD)
            .await;
        assert!(matches!(result, Err(IndexerError::Transport(_))));
    }
}
