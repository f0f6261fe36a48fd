//! Human-readable summary of a swarm intent.

use crate::domain::models::SwarmIntent;

/// Describe what the swarm will do, one sentence per concern.
///
/// Pure function of the intent; the same intent always yields the same text.
pub fn generate_swarm_description(intent: &SwarmIntent) -> String {
    match intent.tasks.as_slice() {
        [] => "No actionable tasks detected.".to_string(),
        [task] => {
            let mut text = format!(
                "Deploying agent to {} {} {} on {}.",
                task.action, task.amount, task.asset, task.target
            );
            if task.requires_zk {
                text.push_str(" ZK verification enabled.");
            }
            text
        }
        tasks => {
            let actions = intent
                .distinct_actions()
                .iter()
                .map(|a| a.as_str())
                .collect::<Vec<_>>()
                .join(" + ");
            let mut text = format!(
                "Swarm of {} sub-agents coordinating: {actions}.",
                tasks.len()
            );
            let zk = intent.zk_task_count();
            if zk > 0 {
                text.push_str(&format!(" {zk} task(s) require ZK verification."));
            }
            text
        }
    }
}
