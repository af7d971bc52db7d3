//! Task records owned by a plan

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::category::TaskCategory;
use super::id::generate_id;
use super::priority::Priority;

/// Execution status of a task
///
/// Tasks are always created `Pending`; the pipeline itself never advances
/// status (that is the caller's concern once the plan is delivered).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// A single task within a plan
///
/// `details` is a free-form string map (e.g. `estimated_time`). The
/// refinement stage scans its keys when computing slot coverage, so detail
/// keys that match a category's required-slot names count toward the
/// completeness score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub description: String,
    pub priority: Priority,
    pub status: TaskStatus,
    pub category: TaskCategory,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Task {
    /// Create a new pending task with a fresh ID
    pub fn new(description: impl Into<String>, priority: Priority, category: TaskCategory) -> Self {
        Self {
            task_id: generate_id("task"),
            description: description.into(),
            priority,
            status: TaskStatus::Pending,
            category,
            details: BTreeMap::new(),
        }
    }

    /// Builder-style detail insertion
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Whether this task populates the given detail slot
    pub fn has_detail(&self, slot: &str) -> bool {
        self.details.contains_key(slot)
    }
}
