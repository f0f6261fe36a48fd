use alloy_primitives::{address, Address};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Main configuration structure for MetaArmy
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Generative-AI intent bridge
    #[serde(default)]
    pub ai: AiConfig,

    /// Block explorer API
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// GraphQL indexer
    #[serde(default)]
    pub indexer: IndexerConfig,

    /// Contract and protocol addresses
    #[serde(default)]
    pub contracts: ContractsConfig,

    /// Local persisted state
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Transaction assembly policy
    #[serde(default)]
    pub assembly: AssemblyConfig,
}

/// Generative-AI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AiConfig {
    /// Set to false to always use the rule-based parser
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// API key; falls back to `GEMINI_API_KEY` and then local storage
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_ai_model")]
    pub model: String,

    #[serde(default = "default_ai_base_url")]
    pub base_url: String,

    /// Upper bound on one generation call
    #[serde(default = "default_ai_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_true() -> bool {
    true
}

fn default_ai_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_ai_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

const fn default_ai_timeout_secs() -> u64 {
    30
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            model: default_ai_model(),
            base_url: default_ai_base_url(),
            timeout_secs: default_ai_timeout_secs(),
        }
    }
}

/// Block explorer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_base_url")]
    pub base_url: String,

    /// Alternate route tried once when the primary reports a deprecated endpoint
    #[serde(default = "default_explorer_fallback_url")]
    pub fallback_url: Option<String>,

    /// Sent as `chainid` (multichain API)
    #[serde(default = "default_chain_id")]
    pub chain_id: Option<u64>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_explorer_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_explorer_rps")]
    pub requests_per_second: f64,
}

fn default_explorer_base_url() -> String {
    "https://api.etherscan.io/v2/api".to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_explorer_fallback_url() -> Option<String> {
    Some("https://api-sepolia.etherscan.io/api".to_string())
}

#[allow(clippy::unnecessary_wraps)]
const fn default_chain_id() -> Option<u64> {
    Some(11_155_111)
}

const fn default_explorer_timeout_secs() -> u64 {
    30
}

const fn default_explorer_rps() -> f64 {
    5.0
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_base_url(),
            fallback_url: default_explorer_fallback_url(),
            chain_id: default_chain_id(),
            api_key: None,
            timeout_secs: default_explorer_timeout_secs(),
            requests_per_second: default_explorer_rps(),
        }
    }
}

/// GraphQL indexer configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct IndexerConfig {
    #[serde(default = "default_indexer_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_indexer_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_indexer_endpoint() -> String {
    "http://localhost:8080/v1/graphql".to_string()
}

const fn default_indexer_timeout_secs() -> u64 {
    15
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_indexer_endpoint(),
            timeout_secs: default_indexer_timeout_secs(),
        }
    }
}

/// Contract addresses used when assembling bundles
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ContractsConfig {
    /// Deployed swarm bundle contract, when known
    #[serde(default)]
    pub swarm_bundle: Option<Address>,

    /// Protocol name (lowercase) to entry-point address
    #[serde(default = "default_protocol_addresses")]
    pub protocols: HashMap<String, Address>,
}

/// Ethereum mainnet entry points for the protocols the parser recognizes
fn default_protocol_addresses() -> HashMap<String, Address> {
    HashMap::from([
        (
            "aave".to_string(),
            address!("87870Bca3F3fD6335C3F4ce8392D69350B4fA4E2"),
        ),
        (
            "uniswap".to_string(),
            address!("E592427A0AEce92De3Edc1F18DFf2FEc2A6eDaDe"),
        ),
        (
            "lido".to_string(),
            address!("ae7ab96520DE3A18E5e111B5EaAb095312F7fE84"),
        ),
        (
            "compound".to_string(),
            address!("c3d688B66703497DAA19211EEdff47f25384cdc3"),
        ),
        (
            "yearn".to_string(),
            address!("50c1a2eA0a861A967D9d0FFE2AE4012c2E053804"),
        ),
        (
            "curve".to_string(),
            address!("bEbc44782C7dB0a1A60Cb6fe97d0b483032FF1C7"),
        ),
    ])
}

impl Default for ContractsConfig {
    fn default() -> Self {
        Self {
            swarm_bundle: None,
            protocols: default_protocol_addresses(),
        }
    }
}

impl ContractsConfig {
    /// Case-insensitive protocol lookup.
    pub fn protocol_address(&self, protocol: &str) -> Option<Address> {
        self.protocols.get(&protocol.trim().to_lowercase()).copied()
    }
}

/// Local storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct StorageConfig {
    /// JSON file holding key/value entries
    #[serde(default = "default_storage_path")]
    pub path: String,
}

fn default_storage_path() -> String {
    ".metaarmy/storage.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_log_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_log_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_log_rotation(),
        }
    }
}

/// What to do with a task whose contract address cannot be resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetPolicy {
    /// Refuse to assemble the bundle
    #[default]
    Strict,
    /// Send the action to the zero address
    ZeroAddress,
}

/// Transaction assembly configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AssemblyConfig {
    #[serde(default)]
    pub target_policy: TargetPolicy,
}
