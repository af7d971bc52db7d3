//! Intake stage - request categorization and acknowledgement
//!
//! Classifies raw request text into a `RequestCategory` and emits a
//! preliminary acknowledgement. The category comes from the model when one
//! is available and its answer parses against the closed enumeration;
//! otherwise from deterministic keyword rules. The acknowledgement is
//! always generated locally so output is non-empty even under full model
//! failure.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::PipelineError;
use crate::config::{Config, RetryConfig};
use crate::domain::{IntakeResult, RequestCategory};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, complete_with_retry};
use crate::prompts::{IntakeContext, PromptRenderer};

/// Keyword tables for rule-based classification, checked in order.
/// Matching is substring-based on the lowercased request text.
const EVENT_KEYWORDS: &[&str] = &["meeting", "event", "conference", "workshop", "appointment", "ceremony"];
const PROJECT_KEYWORDS: &[&str] = &["build", "create", "develop", "project", "implement", "launch"];
const PROBLEM_KEYWORDS: &[&str] = &["problem", "issue", "solve", "fix", "debug", "troubleshoot"];
const PLANNING_KEYWORDS: &[&str] = &["plan", "organize", "schedule", "prepare", "arrange", "roadmap"];

/// Expected model output for categorization
#[derive(Debug, Deserialize)]
struct CategoryOutput {
    category: String,
}

/// Intake stage
pub struct IntakeStage {
    llm: Option<Arc<dyn LlmClient>>,
    prompts: Arc<PromptRenderer>,
    retry: RetryConfig,
    max_tokens: u32,
}

impl IntakeStage {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, prompts: Arc<PromptRenderer>, config: &Config) -> Self {
        Self {
            llm,
            prompts,
            retry: config.pipeline.retry.clone(),
            max_tokens: config.llm.max_tokens,
        }
    }

    /// Process raw request text into an intake result
    ///
    /// Fails only on empty/whitespace input; every model failure falls back
    /// to rule-based classification.
    pub async fn process(&self, request_text: &str) -> Result<IntakeResult, PipelineError> {
        let text = request_text.trim();
        if text.is_empty() {
            return Err(PipelineError::InvalidInput(
                "request text is empty or whitespace-only".to_string(),
            ));
        }

        let category = match &self.llm {
            Some(llm) => match self.model_classify(llm, text).await {
                Ok(category) => {
                    debug!(%category, "intake: model classification accepted");
                    category
                }
                Err(e) => {
                    warn!(error = %e, "intake: model classification failed, using rules");
                    classify(text)
                }
            },
            None => classify(text),
        };

        Ok(IntakeResult::new(category, acknowledgement(category, text), text))
    }

    /// Rule-based intake, used directly by the coordinator's degradation path
    ///
    /// Assumes the coordinator already validated the input as non-empty.
    pub fn rule_based(&self, request_text: &str) -> IntakeResult {
        let text = request_text.trim();
        let category = classify(text);
        IntakeResult::new(category, acknowledgement(category, text), text)
    }

    /// Ask the model for a category and parse it against the closed enum
    async fn model_classify(&self, llm: &Arc<dyn LlmClient>, text: &str) -> Result<RequestCategory, LlmError> {
        let (system_prompt, user) = self
            .prompts
            .render_intake(&IntakeContext { user_input: text })
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user)],
            max_tokens: self.max_tokens.min(100),
        };

        let response = complete_with_retry(llm, request, &self.retry).await?;
        let label = parse_category_label(&response)?;

        label
            .parse::<RequestCategory>()
            .map_err(|_| LlmError::MalformedOutput(format!("unknown category label: {}", label)))
    }
}

/// Extract the category label from a model response
///
/// Accepts the requested JSON shape or, leniently, a bare label.
fn parse_category_label(response: &crate::llm::CompletionResponse) -> Result<String, LlmError> {
    if let Ok(value) = response.json_payload() {
        let output: CategoryOutput =
            serde_json::from_value(value).map_err(|e| LlmError::MalformedOutput(format!("bad category shape: {}", e)))?;
        return Ok(output.category);
    }

    let content = response
        .content
        .as_deref()
        .ok_or_else(|| LlmError::MalformedOutput("empty response body".to_string()))?;
    Ok(content.trim().to_lowercase())
}

/// Deterministic keyword classification
///
/// Pure function of the request text: same text, same category, every call.
pub fn classify(text: &str) -> RequestCategory {
    let lower = text.to_lowercase();
    let matches = |keywords: &[&str]| keywords.iter().any(|k| lower.contains(k));

    if matches(EVENT_KEYWORDS) {
        RequestCategory::Event
    } else if matches(PROJECT_KEYWORDS) {
        RequestCategory::Project
    } else if matches(PROBLEM_KEYWORDS) {
        RequestCategory::ProblemSolving
    } else if matches(PLANNING_KEYWORDS) {
        RequestCategory::Planning
    } else {
        RequestCategory::General
    }
}

/// Locally generated acknowledgement, keyed by category
fn acknowledgement(category: RequestCategory, text: &str) -> String {
    match category {
        RequestCategory::Planning => format!(
            "I can help you put together a plan for: {}. I'll draft a structured approach and flag what still needs deciding.",
            text
        ),
        RequestCategory::ProblemSolving => format!(
            "I'll help you work through this issue: {}. Let me break it down and identify a path to a solution.",
            text
        ),
        RequestCategory::Project => format!(
            "I'll help you scope this project: {}. I'll lay out the build steps and what's needed for each.",
            text
        ),
        RequestCategory::Event => format!(
            "I can help you arrange this: {}. I'll map out the logistics and the details to pin down.",
            text
        ),
        RequestCategory::General => format!(
            "I'll help you with: {}. Let me put together a structured set of next steps.",
            text
        ),
    }
}
