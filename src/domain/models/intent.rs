//! Intent domain models: tasks extracted from user text and the swarm
//! intent that groups them.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The kind of automation a single task performs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    #[default]
    Invest,
    Swap,
    Yield,
    Rebalance,
    Snipe,
    Vote,
    Post,
    Dca,
}

impl Action {
    /// All actions, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Invest,
        Self::Swap,
        Self::Yield,
        Self::Rebalance,
        Self::Snipe,
        Self::Vote,
        Self::Post,
        Self::Dca,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Invest => "invest",
            Self::Swap => "swap",
            Self::Yield => "yield",
            Self::Rebalance => "rebalance",
            Self::Snipe => "snipe",
            Self::Vote => "vote",
            Self::Post => "post",
            Self::Dca => "dca",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "invest" => Some(Self::Invest),
            "swap" => Some(Self::Swap),
            "yield" => Some(Self::Yield),
            "rebalance" => Some(Self::Rebalance),
            "snipe" => Some(Self::Snipe),
            "vote" => Some(Self::Vote),
            "post" => Some(Self::Post),
            "dca" => Some(Self::Dca),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Execution priority for a swarm intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Speed,
    #[default]
    Efficiency,
    Cost,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Speed => "speed",
            Self::Efficiency => "efficiency",
            Self::Cost => "cost",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "speed" => Some(Self::Speed),
            "efficiency" => Some(Self::Efficiency),
            "cost" => Some(Self::Cost),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One atomic automation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// 1-based position within the owning intent
    pub id: usize,
    pub action: Action,
    /// Asset symbol, e.g. "USDC"
    pub asset: String,
    /// Target protocol name, e.g. "Aave"
    pub target: String,
    /// Decimal amount string as written by the user
    pub amount: String,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub requires_zk: bool,
    /// Explicit contract address, when the source of the task knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_address: Option<Address>,
}

/// Aggregate of tasks produced from one user message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwarmIntent {
    pub goal: String,
    pub tasks: Vec<Task>,
    is_bundle: bool,
    pub priority: Priority,
}

impl SwarmIntent {
    /// Build an intent. Task ids are renumbered to their position and
    /// `is_bundle` is derived from the task count.
    pub fn new(goal: impl Into<String>, tasks: Vec<Task>, priority: Priority) -> Self {
        let tasks: Vec<Task> = tasks
            .into_iter()
            .enumerate()
            .map(|(index, task)| Task {
                id: index + 1,
                ..task
            })
            .collect();

        Self {
            goal: goal.into(),
            is_bundle: tasks.len() > 1,
            tasks,
            priority,
        }
    }

    pub fn is_bundle(&self) -> bool {
        self.is_bundle
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Number of tasks flagged for ZK verification.
    pub fn zk_task_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.requires_zk).count()
    }

    /// Distinct actions in first-seen order.
    pub fn distinct_actions(&self) -> Vec<Action> {
        let mut seen = Vec::new();
        for task in &self.tasks {
            if !seen.contains(&task.action) {
                seen.push(task.action);
            }
        }
        seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(action: Action) -> Task {
        Task {
            id: 0,
            action,
            asset: "USDC".to_string(),
            target: "Aave".to_string(),
            amount: "100".to_string(),
            conditions: vec![],
            requires_zk: false,
            target_address: None,
        }
    }

    #[test]
    fn test_action_round_trip_names() {
        for action in Action::ALL {
            assert_eq!(Action::from_str(action.as_str()), Some(action));
        }
        assert_eq!(Action::from_str("  SWAP "), Some(Action::Swap));
        assert_eq!(Action::from_str("teleport"), None);
    }

    #[test]
    fn test_priority_default_is_efficiency() {
        assert_eq!(Priority::default(), Priority::Efficiency);
        assert_eq!(Priority::from_str("Speed"), Some(Priority::Speed));
    }

    #[test]
    fn test_new_renumbers_and_derives_bundle_flag() {
        let intent = SwarmIntent::new(
            "goal",
            vec![task(Action::Invest), task(Action::Vote)],
            Priority::default(),
        );
        assert!(intent.is_bundle());
        assert_eq!(intent.tasks[0].id, 1);
        assert_eq!(intent.tasks[1].id, 2);

        let single = SwarmIntent::new("goal", vec![task(Action::Swap)], Priority::Cost);
        assert!(!single.is_bundle());
    }

    #[test]
    fn test_distinct_actions_first_seen_order() {
        let intent = SwarmIntent::new(
            "goal",
            vec![
                task(Action::Swap),
                task(Action::Invest),
                task(Action::Swap),
            ],
            Priority::default(),
        );
        assert_eq!(intent.distinct_actions(), vec![Action::Swap, Action::Invest]);
    }

    #[test]
    fn test_serializes_camel_case() {
        let intent = SwarmIntent::new("g", vec![task(Action::Dca)], Priority::Speed);
        let json = serde_json::to_value(&intent).unwrap();
        assert_eq!(json["isBundle"], false);
        assert_eq!(json["priority"], "speed");
        assert_eq!(json["tasks"][0]["requiresZk"], false);
        assert!(json["tasks"][0].get("targetAddress").is_none());
    }
}
