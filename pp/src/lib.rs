//! PlanPipe - structured action plans from free-text requests
//!
//! A four-stage pipeline that turns a raw request into a consolidated
//! action plan:
//!
//! 1. **Intake** classifies the request into a closed category set
//! 2. **Planning** decomposes it into an ordered task list
//! 3. **Refinement** scores completeness and fills information gaps
//! 4. **Coordinator** drives the sequence and assembles the final result
//!
//! Each model-backed stage has a deterministic rule-based fallback, so the
//! pipeline produces a complete result for any non-empty input, with or
//! without a working LLM.
//!
//! # Modules
//!
//! - [`domain`] - wire-stable data types (tasks, plans, stage records)
//! - [`llm`] - LLM client trait, OpenAI implementation, retry helper
//! - [`pipeline`] - the stages and the coordinator
//! - [`prompts`] - embedded prompt templates
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod llm;
pub mod pipeline;
pub mod prompts;

// Re-export commonly used types
pub use config::{Config, LlmConfig, PipelineConfig, RetryConfig};
pub use domain::{
    Action, ActionType, FinalResult, IntakeResult, Plan, Priority, RefinementResult, RequestCategory, Task,
    TaskCategory, TaskStatus,
};
pub use llm::{CompletionRequest, CompletionResponse, LlmClient, LlmError, OpenAIClient, create_client};
pub use pipeline::{Coordinator, PipelineError};
