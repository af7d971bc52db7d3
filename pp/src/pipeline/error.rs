//! Pipeline error types

use thiserror::Error;

/// Errors that can cross a stage boundary
///
/// LLM failures never appear here - they are absorbed by the stage that
/// made the call, which substitutes its rule-based output. `InvalidInput`
/// is the only variant callers of the coordinator should ever see.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request text is empty or whitespace-only. Fatal; no partial
    /// artifact is produced.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A rule-based fallback produced a structurally invalid plan.
    ///
    /// Rule-based paths are deterministic and total, so this indicates a
    /// stage defect rather than a runtime input problem.
    #[error("Plan validation failed: {0}")]
    PlanValidation(String),
}
