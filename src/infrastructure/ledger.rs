//! Dry-run bundle ledger.
//!
//! An in-process stand-in for the swarm bundle contract. It keeps the
//! contract's bookkeeping rules so the CLI and tests exercise the full
//! create/execute flow without a signer or an RPC node.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use alloy_primitives::{keccak256, Address, B256};
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::domain::models::{BundleReceipt, CreateSwarmBundleCall, ExecuteBundleCall, SwarmBundleRecord};
use crate::domain::ports::{BundleSubmitter, SubmissionError};

#[derive(Debug, Default)]
pub struct InMemoryBundleLedger {
    bundles: RwLock<HashMap<B256, SwarmBundleRecord>>,
    nonce: AtomicU64,
}

impl InMemoryBundleLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.bundles.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bundles.read().await.is_empty()
    }
}

/// keccak256(user ‖ goal ‖ timestamp ‖ nonce)
pub fn bundle_id(user: Address, goal: &str, timestamp: u64, nonce: u64) -> B256 {
    let mut preimage = Vec::with_capacity(20 + goal.len() + 16);
    preimage.extend_from_slice(user.as_slice());
    preimage.extend_from_slice(goal.as_bytes());
    preimage.extend_from_slice(&timestamp.to_be_bytes());
    preimage.extend_from_slice(&nonce.to_be_bytes());
    keccak256(&preimage)
}

#[async_trait]
impl BundleSubmitter for InMemoryBundleLedger {
    async fn create_swarm_bundle(
        &self,
        user: Address,
        call: CreateSwarmBundleCall,
    ) -> Result<BundleReceipt, SubmissionError> {
        if call.actions.is_empty() {
            return Err(SubmissionError::Reverted("bundle has no actions".to_string()));
        }

        let submitted_at = Utc::now();
        let timestamp = u64::try_from(submitted_at.timestamp()).unwrap_or_default();
        let nonce = self.nonce.fetch_add(1, Ordering::SeqCst);
        let id = bundle_id(user, &call.goal, timestamp, nonce);
        let total_actions = call.actions.len();

        let record = SwarmBundleRecord {
            user,
            goal: call.goal,
            timestamp,
            active: true,
            total_actions: total_actions as u64,
            executed_actions: 0,
        };
        self.bundles.write().await.insert(id, record);

        info!(bundle_id = %id, %user, total_actions, "dry-run bundle recorded");
        Ok(BundleReceipt {
            bundle_id: id,
            user,
            total_actions,
            submitted_at,
        })
    }

    async fn execute_bundle(
        &self,
        user: Address,
        call: ExecuteBundleCall,
    ) -> Result<(), SubmissionError> {
        let mut bundles = self.bundles.write().await;
        let record = bundles
            .get_mut(&call.bundle_id)
            .ok_or_else(|| SubmissionError::Reverted("unknown bundle".to_string()))?;

        if record.user != user {
            return Err(SubmissionError::Reverted("not bundle owner".to_string()));
        }
        if !record.active {
            return Err(SubmissionError::Reverted("bundle not active".to_string()));
        }
        if call.zk_proof_hashes.len() as u64 != record.total_actions {
            return Err(SubmissionError::Reverted(format!(
                "expected {} proof hashes, got {}",
                record.total_actions,
                call.zk_proof_hashes.len()
            )));
        }

        record.executed_actions = record.total_actions;
        record.active = false;
        debug!(bundle_id = %call.bundle_id, "dry-run bundle executed");
        Ok(())
    }

    async fn swarm_bundle(
        &self,
        bundle_id: B256,
    ) -> Result<Option<SwarmBundleRecord>, SubmissionError> {
        Ok(self.bundles.read().await.get(&bundle_id).cloned())
    }
}
