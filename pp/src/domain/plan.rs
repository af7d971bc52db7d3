//! Plan record produced by the planning stage

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::task::Task;

/// An ordered plan of tasks
///
/// Task order is significant and reflects intended execution sequence.
/// The refinement stage may append tasks but never removes or reorders
/// the ones it received.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Stage discriminator, always `"planning"` on the wire
    pub agent_type: String,
    pub plan_id: String,
    pub tasks: Vec<Task>,
    pub timestamp: DateTime<Utc>,
}

impl Plan {
    /// Create a plan from an ordered task list
    pub fn new(tasks: Vec<Task>) -> Self {
        Self {
            agent_type: "planning".to_string(),
            plan_id: generate_id("plan"),
            tasks,
            timestamp: Utc::now(),
        }
    }

    /// Number of tasks in the plan
    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    /// IDs of all tasks, in plan order
    pub fn task_ids(&self) -> Vec<&str> {
        self.tasks.iter().map(|t| t.task_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskCategory};

    #[test]
    fn test_plan_new() {
        let tasks = vec![
            Task::new("First", Priority::High, TaskCategory::Planning),
            Task::new("Second", Priority::Medium, TaskCategory::Planning),
        ];
        let plan = Plan::new(tasks);
        assert!(plan.plan_id.starts_with("plan_"));
        assert_eq!(plan.agent_type, "planning");
        assert_eq!(plan.task_count(), 2);
    }

    #[test]
    fn test_plan_task_ids_ordered() {
        let first = Task::new("First", Priority::High, TaskCategory::General);
        let second = Task::new("Second", Priority::Low, TaskCategory::General);
        let first_id = first.task_id.clone();
        let second_id = second.task_id.clone();

        let plan = Plan::new(vec![first, second]);
        assert_eq!(plan.task_ids(), vec![first_id.as_str(), second_id.as_str()]);
    }

    #[test]
    fn test_plan_timestamp_serializes_rfc3339() {
        let plan = Plan::new(vec![]);
        let value = serde_json::to_value(&plan).unwrap();
        let ts = value["timestamp"].as_str().unwrap();
        // ISO-8601 UTC with trailing offset
        assert!(ts.contains('T'));
        assert!(ts.ends_with('Z') || ts.contains('+'));
    }
}
