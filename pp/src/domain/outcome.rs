//! Final consolidated result assembled by the coordinator

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::generate_id;
use super::intake::IntakeResult;
use super::plan::Plan;
use super::priority::Priority;
use super::refinement::RefinementResult;

/// Kind of entry in the consolidated action plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Answer a clarifying question before proceeding
    Clarification,
    /// Execute a planned task
    TaskExecution,
    /// Gather a missing detail identified during refinement
    DetailGathering,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Clarification => write!(f, "clarification"),
            Self::TaskExecution => write!(f, "task_execution"),
            Self::DetailGathering => write!(f, "detail_gathering"),
        }
    }
}

/// One entry in the final action plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub action_id: String,
    #[serde(rename = "type")]
    pub action_type: ActionType,
    pub description: String,
    pub priority: Priority,
    #[serde(default)]
    pub details: BTreeMap<String, String>,
}

impl Action {
    pub fn new(action_type: ActionType, description: impl Into<String>, priority: Priority) -> Self {
        Self {
            action_id: generate_id("action"),
            action_type,
            description: description.into(),
            priority,
            details: BTreeMap::new(),
        }
    }

    /// Builder-style detail insertion
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

/// Terminal artifact of a processed request
///
/// Embeds the three stage outputs verbatim, plus the coordinator-derived
/// summary, action plan, and recommendations. Built once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalResult {
    pub result_id: String,
    pub user_input: String,
    pub intake_output: IntakeResult,
    pub planning_output: Plan,
    pub refinement_output: RefinementResult,
    pub summary: String,
    pub action_plan: Vec<Action>,
    pub recommendations: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

impl FinalResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_input: impl Into<String>,
        intake_output: IntakeResult,
        planning_output: Plan,
        refinement_output: RefinementResult,
        summary: impl Into<String>,
        action_plan: Vec<Action>,
        recommendations: Vec<String>,
    ) -> Self {
        Self {
            result_id: generate_id("result"),
            user_input: user_input.into(),
            intake_output,
            planning_output,
            refinement_output,
            summary: summary.into(),
            action_plan,
            recommendations,
            timestamp: Utc::now(),
        }
    }
}
