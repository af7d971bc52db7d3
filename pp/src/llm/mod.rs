//! LLM client module
//!
//! Provides the `LlmClient` abstraction the pipeline stages delegate to,
//! the OpenAI implementation, and the shared retry helper.

use std::sync::Arc;

use tracing::debug;

pub mod client;
mod error;
mod openai;
mod retry;
mod types;

pub use client::LlmClient;
pub use error::LlmError;
pub use openai::OpenAIClient;
pub use retry::complete_with_retry;
pub use types::{CompletionRequest, CompletionResponse, Message, Role, TokenUsage};

use crate::config::LlmConfig;

/// Create an LLM client based on the provider specified in config
///
/// Currently only "openai" is supported. A missing API key surfaces as
/// `LlmError::Unavailable`; callers treat that as "run rule-based".
pub fn create_client(config: &LlmConfig) -> Result<Arc<dyn LlmClient>, LlmError> {
    debug!(provider = %config.provider, model = %config.model, "create_client: called");
    match config.provider.as_str() {
        "openai" => Ok(Arc::new(OpenAIClient::from_config(config)?)),
        other => Err(LlmError::Unavailable(format!(
            "Unknown LLM provider: '{}'. Supported: openai",
            other
        ))),
    }
}
