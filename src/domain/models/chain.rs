//! On-chain representations of a confirmed swarm intent.

use alloy_primitives::{Address, Bytes, B256, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One element of the `actions` array passed to `createSwarmBundle`.
///
/// Solidity shape: `(address target, uint256 amount, bytes data, bool requiresZk)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainAction {
    pub target: Address,
    pub amount: U256,
    pub data: Bytes,
    pub requires_zk: bool,
}

/// Arguments of `createSwarmBundle(string goal, Action[] actions) -> bytes32`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSwarmBundleCall {
    pub goal: String,
    pub actions: Vec<ChainAction>,
}

/// Arguments of `executeBundle(bytes32 bundleId, bytes32[] zkProofHashes)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteBundleCall {
    pub bundle_id: B256,
    pub zk_proof_hashes: Vec<B256>,
}

impl ExecuteBundleCall {
    /// Zero-filled proof hashes, one per action. No proof is generated.
    pub fn with_placeholder_proofs(bundle_id: B256, action_count: usize) -> Self {
        Self {
            bundle_id,
            zk_proof_hashes: vec![B256::ZERO; action_count],
        }
    }
}

/// Result of a successful `createSwarmBundle` submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleReceipt {
    pub bundle_id: B256,
    pub user: Address,
    pub total_actions: usize,
    pub submitted_at: DateTime<Utc>,
}

/// Read-only view returned by `swarmBundles(bytes32)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmBundleRecord {
    pub user: Address,
    pub goal: String,
    /// Unix seconds
    pub timestamp: u64,
    pub active: bool,
    pub total_actions: u64,
    pub executed_actions: u64,
}
