//! User-tunable agent settings persisted in local storage.

use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};

/// Storage key the settings are persisted under.
pub const AGENT_SETTINGS_KEY: &str = "metaarmy_agent_config";

const MAX_SLIPPAGE_PERCENT: f64 = 50.0;
const MAX_SWARM_SIZE: usize = 20;
/// Longest wait allowed between bundle creation and execution.
pub const MAX_EXECUTION_DELAY_SECS: u64 = 3600;

/// How aggressively agents are allowed to act.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskAppetite {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl RiskAppetite {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Conservative => "conservative",
            Self::Balanced => "balanced",
            Self::Aggressive => "aggressive",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "conservative" | "low" => Some(Self::Conservative),
            "balanced" | "medium" => Some(Self::Balanced),
            "aggressive" | "high" => Some(Self::Aggressive),
            _ => None,
        }
    }
}

/// Agent configuration object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSettings {
    #[serde(default)]
    pub risk_appetite: RiskAppetite,

    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,

    /// Percent, e.g. 0.5 for 0.5%
    #[serde(default = "default_slippage_tolerance")]
    pub slippage_tolerance: f64,

    #[serde(default)]
    pub auto_execute: bool,

    #[serde(default = "default_max_swarm_size")]
    pub max_swarm_size: usize,

    /// Seconds to wait before executing a created bundle
    #[serde(default)]
    pub execution_delay: u64,
}

const fn default_gas_limit() -> u64 {
    500_000
}

const fn default_slippage_tolerance() -> f64 {
    0.5
}

const fn default_max_swarm_size() -> usize {
    5
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            risk_appetite: RiskAppetite::default(),
            gas_limit: default_gas_limit(),
            slippage_tolerance: default_slippage_tolerance(),
            auto_execute: false,
            max_swarm_size: default_max_swarm_size(),
            execution_delay: 0,
        }
    }
}

impl AgentSettings {
    pub fn validate(&self) -> DomainResult<()> {
        if self.gas_limit == 0 {
            return Err(DomainError::ValidationFailed(
                "gas_limit must be greater than 0".to_string(),
            ));
        }
        if !(0.0..=MAX_SLIPPAGE_PERCENT).contains(&self.slippage_tolerance) {
            return Err(DomainError::ValidationFailed(format!(
                "slippage_tolerance must be between 0 and {MAX_SLIPPAGE_PERCENT}, got {}",
                self.slippage_tolerance
            )));
        }
        if self.max_swarm_size == 0 || self.max_swarm_size > MAX_SWARM_SIZE {
            return Err(DomainError::ValidationFailed(format!(
                "max_swarm_size must be between 1 and {MAX_SWARM_SIZE}, got {}",
                self.max_swarm_size
            )));
        }
        if self.execution_delay > MAX_EXECUTION_DELAY_SECS {
            return Err(DomainError::ValidationFailed(format!(
                "execution_delay must be at most {MAX_EXECUTION_DELAY_SECS} seconds, got {}",
                self.execution_delay
            )));
        }
        Ok(())
    }

    /// Update one field by its name, as typed on the command line.
    pub fn set_field(&mut self, key: &str, value: &str) -> DomainResult<()> {
        let invalid = |what: &str| {
            DomainError::ValidationFailed(format!("Invalid value for {key}: {value} ({what})"))
        };

        let mut next = self.clone();
        match key.replace('-', "_").to_lowercase().as_str() {
            "risk_appetite" | "riskappetite" => {
                next.risk_appetite = RiskAppetite::from_str(value)
                    .ok_or_else(|| invalid("expected conservative, balanced or aggressive"))?;
            }
            "gas_limit" | "gaslimit" => {
                next.gas_limit = value.parse().map_err(|_| invalid("expected integer"))?;
            }
            "slippage_tolerance" | "slippagetolerance" | "slippage" => {
                next.slippage_tolerance = value
                    .trim_end_matches('%')
                    .parse()
                    .map_err(|_| invalid("expected number"))?;
            }
            "auto_execute" | "autoexecute" => {
                next.auto_execute = match value.to_lowercase().as_str() {
                    "true" | "yes" | "on" | "1" => true,
                    "false" | "no" | "off" | "0" => false,
                    _ => return Err(invalid("expected true or false")),
                };
            }
            "max_swarm_size" | "maxswarmsize" => {
                next.max_swarm_size = value.parse().map_err(|_| invalid("expected integer"))?;
            }
            "execution_delay" | "executiondelay" => {
                next.execution_delay = value.parse().map_err(|_| invalid("expected seconds"))?;
            }
            _ => {
                return Err(DomainError::ValidationFailed(format!(
                    "Unknown setting: {key}"
                )))
            }
        }

        next.validate()?;
        *self = next;
        Ok(())
    }
}
