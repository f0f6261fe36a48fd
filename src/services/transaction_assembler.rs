//! Converts a confirmed intent into contract-call arguments.

use alloy_primitives::{Address, Bytes, U256};
use thiserror::Error;
use tracing::warn;

use crate::domain::models::{
    ChainAction, Config, ContractsConfig, CreateSwarmBundleCall, SwarmIntent, TargetPolicy, Task,
};

const USDC_DECIMALS: u32 = 6;
const DEFAULT_DECIMALS: u32 = 18;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssemblyError {
    #[error("Intent has no tasks to assemble")]
    EmptyIntent,

    #[error("Task {task_id}: invalid amount '{amount}'")]
    InvalidAmount { task_id: usize, amount: String },

    #[error("Task {task_id}: no contract address known for protocol '{protocol}'")]
    UnresolvedTarget { task_id: usize, protocol: String },
}

/// Token decimals for a task: 6 for USDC, 18 otherwise.
pub fn decimals_for(task: &Task) -> u32 {
    let mentions_usdc = |s: &str| s.to_ascii_lowercase().contains("usdc");
    if mentions_usdc(&task.asset) || mentions_usdc(&task.amount) {
        USDC_DECIMALS
    } else {
        DEFAULT_DECIMALS
    }
}

/// Scale a human decimal string into base units.
///
/// Characters other than digits and `.` are dropped first, so `"1,000 USDC"`
/// reads as `1000`. An empty result is zero. Fraction digits beyond
/// `decimals` are truncated. Returns `None` for more than one decimal
/// point or a value that overflows 256 bits.
pub fn scale_amount(amount: &str, decimals: u32) -> Option<U256> {
    let cleaned: String = amount
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    if cleaned.matches('.').count() > 1 {
        return None;
    }

    let (whole, fraction) = cleaned.split_once('.').unwrap_or((cleaned.as_str(), ""));
    let width = decimals as usize;
    let mut fraction: String = fraction.chars().take(width).collect();
    while fraction.len() < width {
        fraction.push('0');
    }

    let digits = format!("{whole}{fraction}");
    let digits = digits.trim_start_matches('0');
    if digits.is_empty() {
        return Some(U256::ZERO);
    }
    U256::from_str_radix(digits, 10).ok()
}

/// Builds `createSwarmBundle` arguments from an intent.
#[derive(Debug, Clone, Default)]
pub struct TransactionAssembler {
    contracts: ContractsConfig,
    policy: TargetPolicy,
}

impl TransactionAssembler {
    pub fn new(contracts: ContractsConfig, policy: TargetPolicy) -> Self {
        Self { contracts, policy }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.contracts.clone(), config.assembly.target_policy)
    }

    pub fn policy(&self) -> TargetPolicy {
        self.policy
    }

    /// One action per task, in task order.
    pub fn assemble(&self, intent: &SwarmIntent) -> Result<Vec<ChainAction>, AssemblyError> {
        if intent.is_empty() {
            return Err(AssemblyError::EmptyIntent);
        }
        intent.tasks.iter().map(|task| self.assemble_task(task)).collect()
    }

    pub fn build_call(&self, intent: &SwarmIntent) -> Result<CreateSwarmBundleCall, AssemblyError> {
        Ok(CreateSwarmBundleCall {
            goal: intent.goal.clone(),
            actions: self.assemble(intent)?,
        })
    }

    /// Check that `assemble` would succeed, without logging or building
    /// anything.
    pub fn validate(&self, intent: &SwarmIntent) -> Result<(), AssemblyError> {
        if intent.is_empty() {
            return Err(AssemblyError::EmptyIntent);
        }
        for task in &intent.tasks {
            Self::scaled_amount(task)?;
            if self.policy == TargetPolicy::Strict && self.lookup_target(task).is_none() {
                return Err(Self::unresolved(task));
            }
        }
        Ok(())
    }

    fn assemble_task(&self, task: &Task) -> Result<ChainAction, AssemblyError> {
        Ok(ChainAction {
            target: self.resolve_target(task)?,
            amount: Self::scaled_amount(task)?,
            data: Bytes::new(),
            requires_zk: task.requires_zk,
        })
    }

    fn scaled_amount(task: &Task) -> Result<U256, AssemblyError> {
        scale_amount(&task.amount, decimals_for(task)).ok_or_else(|| AssemblyError::InvalidAmount {
            task_id: task.id,
            amount: task.amount.clone(),
        })
    }

    fn lookup_target(&self, task: &Task) -> Option<Address> {
        task.target_address
            .or_else(|| self.contracts.protocol_address(&task.target))
    }

    fn unresolved(task: &Task) -> AssemblyError {
        AssemblyError::UnresolvedTarget {
            task_id: task.id,
            protocol: task.target.clone(),
        }
    }

    fn resolve_target(&self, task: &Task) -> Result<Address, AssemblyError> {
        if let Some(address) = self.lookup_target(task) {
            return Ok(address);
        }

        match self.policy {
            TargetPolicy::Strict => Err(Self::unresolved(task)),
            TargetPolicy::ZeroAddress => {
                warn!(
                    task_id = task.id,
                    protocol = %task.target,
                    "no contract address for protocol, using zero address"
                );
                Ok(Address::ZERO)
            }
        }
    }
}
