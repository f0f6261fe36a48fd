//! Records served by the GraphQL indexer.
//!
//! BigInt and BigDecimal columns arrive as strings and are kept that way;
//! callers that need numbers parse at the edge.

use serde::{Deserialize, Serialize};

/// One indexed user action (swap, deposit, bundle creation, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub id: String,
    pub user: String,
    pub activity_type: String,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub tx_hash: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A delegated spending permission granted to a session account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Permission {
    pub id: String,
    pub user: String,
    pub delegate: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub allowance: String,
    /// Period length in seconds for periodic allowances
    #[serde(default)]
    pub period: Option<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub active: bool,
}

/// Point-in-time valuation of a user's holdings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub id: String,
    pub user: String,
    #[serde(default)]
    pub total_value_usd: String,
    #[serde(default)]
    pub timestamp: String,
}

/// A yield opportunity tracked by the indexer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct YieldPool {
    pub id: String,
    pub protocol: String,
    pub asset: String,
    #[serde(default)]
    pub apy: String,
    #[serde(default)]
    pub tvl: String,
}

impl YieldPool {
    pub fn apy_percent(&self) -> Option<f64> {
        self.apy.parse().ok()
    }
}
