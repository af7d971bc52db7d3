//! LLM error types

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during LLM operations
///
/// Every variant is recovered inside the stage that triggered the call by
/// falling back to rule-based logic; none of these cross the coordinator
/// boundary.
#[derive(Debug, Error)]
pub enum LlmError {
    /// No usable client: missing credential, unknown provider, or the HTTP
    /// client could not be constructed
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Duration },

    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The response did not parse against the expected shape
    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LlmError {
    /// Check if this error is transient and worth retrying
    ///
    /// Non-transient failures (missing credential, 4xx, unparseable output)
    /// fall back immediately without retry.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Unavailable(_) => false,
            LlmError::Timeout(_) => true,
            LlmError::RateLimited { .. } => true,
            LlmError::ApiError { status, .. } => *status >= 500,
            LlmError::Network(_) => true,
            LlmError::MalformedOutput(_) => false,
            LlmError::Json(_) => false,
        }
    }

    /// Get the retry delay if this is a rate limit error
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            LlmError::RateLimited { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
