//! Intake stage output record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::category::RequestCategory;

/// Result of intake classification
///
/// Produced once per request and never mutated afterward. The
/// acknowledgement (`response`) is always locally generated, so it is
/// non-empty even when every model call fails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeResult {
    /// Stage discriminator, always `"intake"` on the wire
    pub agent_type: String,
    pub category: RequestCategory,
    pub response: String,
    pub user_input: String,
    pub timestamp: DateTime<Utc>,
}

impl IntakeResult {
    pub fn new(category: RequestCategory, response: impl Into<String>, user_input: impl Into<String>) -> Self {
        Self {
            agent_type: "intake".to_string(),
            category,
            response: response.into(),
            user_input: user_input.into(),
            timestamp: Utc::now(),
        }
    }
}
