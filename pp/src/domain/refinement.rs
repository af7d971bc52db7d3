//! Refinement stage output record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::Plan;

/// Result of plan refinement
///
/// Carries the (possibly augmented) plan, the clarifying questions, the
/// names of the detail slots found missing, and the completeness score.
/// The score is a pure function of the plan's populated slots — see
/// `pipeline::refinement::completeness_score`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    /// Stage discriminator, always `"refinement"` on the wire
    pub agent_type: String,
    pub refined_plan: Plan,
    pub questions: Vec<String>,
    pub missing_details: Vec<String>,
    pub completeness_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl RefinementResult {
    pub fn new(
        refined_plan: Plan,
        questions: Vec<String>,
        missing_details: Vec<String>,
        completeness_score: f64,
    ) -> Self {
        Self {
            agent_type: "refinement".to_string(),
            refined_plan,
            questions,
            missing_details,
            completeness_score,
            timestamp: Utc::now(),
        }
    }
}
