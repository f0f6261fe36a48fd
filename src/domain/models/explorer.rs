//! Block-explorer transaction records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Envelope returned by Etherscan-compatible `account/txlist` queries.
#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerEnvelope {
    pub status: String,
    pub message: String,
    /// Either an array of transactions or an error string
    pub result: serde_json::Value,
}

/// One transaction as reported by the explorer. Numeric fields arrive
/// as decimal strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExplorerTransaction {
    pub hash: String,
    #[serde(default)]
    pub from: String,
    #[serde(default)]
    pub to: String,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub time_stamp: String,
    #[serde(default)]
    pub gas_used: String,
    #[serde(default)]
    pub gas_price: String,
    #[serde(default)]
    pub is_error: String,
}

impl ExplorerTransaction {
    pub fn failed(&self) -> bool {
        self.is_error == "1"
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.time_stamp
            .parse::<i64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    /// First four bytes of calldata, e.g. `0xa9059cbb`.
    pub fn method_selector(&self) -> Option<&str> {
        if self.input.len() >= 10 && self.input.starts_with("0x") {
            self.input.get(..10)
        } else {
            None
        }
    }

    /// Gas fee in wei, when both fields parse.
    pub fn fee_wei(&self) -> Option<u128> {
        let used: u128 = self.gas_used.parse().ok()?;
        let price: u128 = self.gas_price.parse().ok()?;
        used.checked_mul(price)
    }
}
