//! Planning stage - task decomposition
//!
//! Turns an intake result into an ordered `Plan`. The model path asks for
//! a task list and validates it against the closed priority set; any
//! failure or malformed answer drops to the category-template fallback,
//! which is total over the request categories.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use super::error::PipelineError;
use crate::config::{Config, RetryConfig};
use crate::domain::{IntakeResult, Plan, Priority, RequestCategory, Task, TaskCategory};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, complete_with_retry};
use crate::prompts::{PlanningContext, PromptRenderer};

/// Expected model output shape for plan generation
#[derive(Debug, Deserialize)]
struct PlanOutput {
    tasks: Vec<TaskOutput>,
}

#[derive(Debug, Deserialize)]
struct TaskOutput {
    description: String,
    priority: Option<String>,
    estimated_time: Option<String>,
}

/// Planning stage
pub struct PlanningStage {
    llm: Option<Arc<dyn LlmClient>>,
    prompts: Arc<PromptRenderer>,
    retry: RetryConfig,
    max_tokens: u32,
}

impl PlanningStage {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, prompts: Arc<PromptRenderer>, config: &Config) -> Self {
        Self {
            llm,
            prompts,
            retry: config.pipeline.retry.clone(),
            max_tokens: config.llm.max_tokens,
        }
    }

    /// Produce a plan for a categorized request
    ///
    /// Task IDs are always minted locally; the model only supplies
    /// descriptions, priorities, and time estimates.
    pub async fn create_plan(&self, intake: &IntakeResult) -> Result<Plan, PipelineError> {
        if let Some(llm) = &self.llm {
            match self.model_plan(llm, intake).await {
                Ok(plan) => {
                    debug!(task_count = plan.task_count(), "planning: model plan accepted");
                    return Ok(plan);
                }
                Err(e) => {
                    warn!(error = %e, "planning: model plan failed, using templates");
                }
            }
        }
        self.fallback_plan(intake)
    }

    /// Ask the model for a task list and validate it
    async fn model_plan(&self, llm: &Arc<dyn LlmClient>, intake: &IntakeResult) -> Result<Plan, LlmError> {
        let (system_prompt, user) = self
            .prompts
            .render_planning(&PlanningContext {
                user_input: &intake.user_input,
                category: intake.category.to_string(),
            })
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user)],
            max_tokens: self.max_tokens,
        };

        let response = complete_with_retry(llm, request, &self.retry).await?;
        let output: PlanOutput = serde_json::from_value(response.json_payload()?)
            .map_err(|e| LlmError::MalformedOutput(format!("bad plan shape: {}", e)))?;

        if output.tasks.is_empty() {
            return Err(LlmError::MalformedOutput("model returned an empty task list".to_string()));
        }

        let task_category = TaskCategory::from(intake.category);
        let mut tasks = Vec::with_capacity(output.tasks.len());
        for entry in output.tasks {
            if entry.description.trim().is_empty() {
                return Err(LlmError::MalformedOutput("task with empty description".to_string()));
            }
            // An unparseable priority invalidates the whole answer rather
            // than being silently coerced.
            let priority = match entry.priority.as_deref() {
                Some(label) => label
                    .parse::<Priority>()
                    .map_err(|_| LlmError::MalformedOutput(format!("unknown priority: {}", label)))?,
                None => Priority::Medium,
            };
            let estimated_time = entry
                .estimated_time
                .unwrap_or_else(|| default_estimate(task_category).to_string());

            tasks.push(
                Task::new(entry.description.trim(), priority, task_category)
                    .with_detail("estimated_time", estimated_time),
            );
        }

        Ok(Plan::new(tasks))
    }

    /// Deterministic template plan, used directly by the coordinator's
    /// degradation path
    pub fn fallback_plan(&self, intake: &IntakeResult) -> Result<Plan, PipelineError> {
        let category = TaskCategory::from(intake.category);
        let tasks: Vec<Task> = template_tasks(intake.category)
            .iter()
            .map(|(description, priority)| {
                Task::new(*description, *priority, category)
                    .with_detail("estimated_time", default_estimate(category))
            })
            .collect();

        let plan = Plan::new(tasks);
        validate_plan(&plan)?;
        Ok(plan)
    }
}

/// Structural guard on fallback output
///
/// The templates are static and non-empty, so a failure here is a stage
/// defect, not a runtime input problem.
fn validate_plan(plan: &Plan) -> Result<(), PipelineError> {
    if plan.tasks.is_empty() {
        return Err(PipelineError::PlanValidation(
            "fallback produced a plan with no tasks".to_string(),
        ));
    }
    Ok(())
}

/// Per-category task templates for the rule-based path
fn template_tasks(category: RequestCategory) -> &'static [(&'static str, Priority)] {
    match category {
        RequestCategory::Planning => &[
            ("Define objectives and scope", Priority::High),
            ("Identify required resources and stakeholders", Priority::High),
            ("Draft a timeline with milestones", Priority::Medium),
            ("Define success criteria and checkpoints", Priority::Medium),
        ],
        RequestCategory::ProblemSolving => &[
            ("Define the problem precisely and gather evidence", Priority::High),
            ("Identify constraints and root causes", Priority::High),
            ("Generate and compare alternative solutions", Priority::Medium),
            ("Select a solution and define success metrics", Priority::Medium),
        ],
        RequestCategory::Project => &[
            ("Gather requirements and define deliverables", Priority::High),
            ("Estimate budget and assemble the team", Priority::High),
            ("Build a phased timeline", Priority::Medium),
            ("Set up progress tracking and review cadence", Priority::Low),
        ],
        RequestCategory::Event => &[
            ("Confirm date and time", Priority::High),
            ("Book a location", Priority::High),
            ("Draft the attendee list and send invitations", Priority::Medium),
            ("Prepare the agenda and materials", Priority::Medium),
        ],
        RequestCategory::General => &[
            ("Clarify objectives", Priority::High),
            ("Identify constraints", Priority::Medium),
            ("Define success criteria and next steps", Priority::Medium),
        ],
    }
}

/// Default time estimate when neither the model nor a template supplies one
fn default_estimate(category: TaskCategory) -> &'static str {
    match category {
        TaskCategory::Planning => "1 hour",
        TaskCategory::ProblemSolving => "1-2 hours",
        TaskCategory::Project => "2-3 hours",
        TaskCategory::Event => "1 hour",
        TaskCategory::General => "1 hour",
        TaskCategory::DetailGathering => "30 minutes",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TaskStatus;
    use crate::llm::client::mock::MockLlmClient;

    fn intake(category: RequestCategory) -> IntakeResult {
        IntakeResult::new(category, "ack", "some request")
    }

    fn stage(llm: Option<Arc<dyn LlmClient>>) -> PlanningStage {
        PlanningStage::new(llm, Arc::new(PromptRenderer::new().unwrap()), &Config::default())
    }

    #[tokio::test]
    async fn test_fallback_plan_every_category_nonempty() {
        let stage = stage(None);
        for category in RequestCategory::ALL {
            let plan = stage.create_plan(&intake(category)).await.unwrap();
            assert!(plan.task_count() >= 3, "category {} produced too few tasks", category);
            for task in &plan.tasks {
                assert_eq!(task.status, TaskStatus::Pending);
                assert_eq!(task.category, TaskCategory::from(category));
                assert!(task.has_detail("estimated_time"));
            }
        }
    }

    #[tokio::test]
    async fn test_model_plan_accepted() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"tasks": [
                {"description": "Survey venues", "priority": "high", "estimated_time": "2 hours"},
                {"description": "Send invitations", "priority": "low"}
            ]}"#,
        ]));
        let stage = stage(Some(llm));

        let plan = stage.create_plan(&intake(RequestCategory::Event)).await.unwrap();
        assert_eq!(plan.task_count(), 2);
        assert_eq!(plan.tasks[0].description, "Survey venues");
        assert_eq!(plan.tasks[0].priority, Priority::High);
        assert_eq!(plan.tasks[0].details["estimated_time"], "2 hours");
        // Missing fields take defaults
        assert_eq!(plan.tasks[1].priority, Priority::Low);
        assert_eq!(plan.tasks[1].details["estimated_time"], "1 hour");
        // IDs are always minted locally
        assert!(plan.tasks.iter().all(|t| t.task_id.starts_with("task_")));
    }

    #[tokio::test]
    async fn test_model_empty_task_list_falls_back() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(vec![r#"{"tasks": []}"#]));
        let stage = stage(Some(llm));

        let plan = stage.create_plan(&intake(RequestCategory::Project)).await.unwrap();
        assert!(plan.task_count() >= 3);
    }

    #[tokio::test]
    async fn test_model_invalid_priority_falls_back() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"tasks": [{"description": "Do a thing", "priority": "urgent"}]}"#,
        ]));
        let stage = stage(Some(llm));

        let plan = stage.create_plan(&intake(RequestCategory::General)).await.unwrap();
        // Fallback template, not the model's single task
        assert!(plan.task_count() >= 3);
        assert!(plan.tasks.iter().all(|t| t.description != "Do a thing"));
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::unavailable());
        let stage = stage(Some(llm));

        let plan = stage.create_plan(&intake(RequestCategory::Planning)).await.unwrap();
        assert!(plan.task_count() >= 3);
    }

    #[tokio::test]
    async fn test_model_prose_falls_back() {
        let llm: Arc<dyn LlmClient> =
            Arc::new(MockLlmClient::with_texts(vec!["Here are some steps you could take..."]));
        let stage = stage(Some(llm));

        let plan = stage.create_plan(&intake(RequestCategory::Event)).await.unwrap();
        assert!(plan.task_count() >= 3);
    }

    #[test]
    fn test_fallback_plan_deterministic_descriptions() {
        let stage = stage(None);
        let a = stage.fallback_plan(&intake(RequestCategory::Event)).unwrap();
        let b = stage.fallback_plan(&intake(RequestCategory::Event)).unwrap();
        let descs = |p: &Plan| p.tasks.iter().map(|t| t.description.clone()).collect::<Vec<_>>();
        assert_eq!(descs(&a), descs(&b));
        // IDs are fresh per plan
        assert_ne!(a.plan_id, b.plan_id);
    }

    #[test]
    fn test_detail_gathering_estimate() {
        assert_eq!(default_estimate(TaskCategory::DetailGathering), "30 minutes");
    }
}
