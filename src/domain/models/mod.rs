//! Domain models.

pub mod chain;
pub mod config;
pub mod explorer;
pub mod indexer;
pub mod intent;
pub mod session;
pub mod settings;

pub use chain::{
    BundleReceipt, ChainAction, CreateSwarmBundleCall, ExecuteBundleCall, SwarmBundleRecord,
};
pub use config::{
    AiConfig, AssemblyConfig, Config, ContractsConfig, ExplorerConfig, IndexerConfig,
    LoggingConfig, StorageConfig, TargetPolicy,
};
pub use explorer::{ExplorerEnvelope, ExplorerTransaction};
pub use indexer::{Permission, PortfolioSnapshot, UserActivity, YieldPool};
pub use intent::{Action, Priority, SwarmIntent, Task};
pub use session::{ChatMessage, ChatSession, Notice, NoticeLevel, PendingState, Role};
pub use settings::{AgentSettings, RiskAppetite, AGENT_SETTINGS_KEY};
