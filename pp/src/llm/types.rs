//! LLM request/response types
//!
//! These model the OpenAI Chat Completions API but are provider-agnostic
//! enough to support other providers.

use serde::{Deserialize, Serialize};

use super::LlmError;

/// A completion request - everything needed for one LLM call
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    /// System prompt (rendered from a Handlebars template)
    pub system_prompt: String,

    /// User messages (typically just one per stage call)
    pub messages: Vec<Message>,

    /// Max tokens for the response (from config)
    pub max_tokens: u32,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    /// Create a user message
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: text.into(),
        }
    }

    /// Create an assistant message
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: text.into(),
        }
    }
}

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Response from a completion request
#[derive(Debug, Clone, Default)]
pub struct CompletionResponse {
    /// Text content (if any)
    pub content: Option<String>,

    /// Token usage for observability
    pub usage: TokenUsage,
}

impl CompletionResponse {
    /// Create a text-only response (used heavily by tests and mocks)
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: TokenUsage::default(),
        }
    }

    /// Parse the response content as JSON
    ///
    /// Models frequently wrap JSON in markdown code fences; those are
    /// stripped before parsing. A missing or unparseable body yields
    /// `LlmError::MalformedOutput`, which stages treat as a fallback
    /// trigger.
    pub fn json_payload(&self) -> Result<serde_json::Value, LlmError> {
        let content = self
            .content
            .as_deref()
            .ok_or_else(|| LlmError::MalformedOutput("empty response body".to_string()))?;

        let stripped = strip_code_fences(content);
        serde_json::from_str(stripped)
            .map_err(|e| LlmError::MalformedOutput(format!("response is not valid JSON: {}", e)))
    }
}

/// Strip a surrounding markdown code fence, if present
fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag line (e.g. ```json)
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").map(str::trim).unwrap_or(trimmed)
}

/// Token usage for observability
#[derive(Debug, Clone, Copy, Default)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}
