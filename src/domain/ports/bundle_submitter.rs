//! Bundle submission port.
//!
//! Stands in for the wallet/bundler collaborator that signs and sends
//! `createSwarmBundle` / `executeBundle`.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;

use crate::domain::models::{BundleReceipt, CreateSwarmBundleCall, ExecuteBundleCall, SwarmBundleRecord};

/// Failures surfaced by the signer or the chain.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmissionError {
    #[error("User rejected the request")]
    UserRejected,

    #[error("Insufficient funds for gas or value")]
    InsufficientFunds,

    #[error("Execution reverted: {0}")]
    Reverted(String),

    #[error("RPC error: {0}")]
    Rpc(String),
}

impl SubmissionError {
    /// Generic, user-facing cause for notices.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::UserRejected => "You rejected the transaction in your wallet.",
            Self::InsufficientFunds => "Insufficient funds to cover gas or value.",
            Self::Reverted(_) => "The contract rejected the bundle.",
            Self::Rpc(_) => "Network error while submitting the transaction.",
        }
    }
}

#[async_trait]
pub trait BundleSubmitter: Send + Sync {
    async fn create_swarm_bundle(
        &self,
        user: Address,
        call: CreateSwarmBundleCall,
    ) -> Result<BundleReceipt, SubmissionError>;

    async fn execute_bundle(
        &self,
        user: Address,
        call: ExecuteBundleCall,
    ) -> Result<(), SubmissionError>;

    async fn swarm_bundle(&self, bundle_id: B256)
        -> Result<Option<SwarmBundleRecord>, SubmissionError>;
}
