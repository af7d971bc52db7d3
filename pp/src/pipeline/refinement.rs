//! Refinement stage - gap analysis and slot-filling
//!
//! Scores a plan's completeness against the category's required detail
//! slots, produces clarifying questions for the gaps, and appends one
//! detail-gathering task per missing slot. Never removes or reorders the
//! tasks it received, and refining an already-refined plan is a no-op.

use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{Config, RetryConfig};
use crate::domain::{IntakeResult, Plan, Priority, RefinementResult, RequestCategory, Task, TaskCategory};
use crate::llm::{CompletionRequest, LlmClient, LlmError, Message, complete_with_retry};
use crate::prompts::{PromptRenderer, RefinementContext};

/// Detail key under which an appended gathering task records its target
/// slot. Deliberately not the slot name itself, so appending the task does
/// not count as populating the slot.
const TARGET_DETAIL_KEY: &str = "target_detail";

/// Expected model output shape for refinement
#[derive(Debug, Deserialize)]
struct RefinementOutput {
    missing_details: Vec<String>,
    questions: Vec<String>,
}

/// Refinement stage
pub struct RefinementStage {
    llm: Option<Arc<dyn LlmClient>>,
    prompts: Arc<PromptRenderer>,
    retry: RetryConfig,
    max_tokens: u32,
    max_questions: usize,
}

impl RefinementStage {
    pub fn new(llm: Option<Arc<dyn LlmClient>>, prompts: Arc<PromptRenderer>, config: &Config) -> Self {
        Self {
            llm,
            prompts,
            retry: config.pipeline.retry.clone(),
            max_tokens: config.llm.max_tokens,
            max_questions: config.pipeline.max_questions,
        }
    }

    /// Refine a plan: score it, question the gaps, append gathering tasks
    ///
    /// The completeness score is always computed locally, model or not.
    pub async fn refine(&self, plan: &Plan, intake: &IntakeResult) -> RefinementResult {
        let slots = required_slots(intake.category);
        let locally_missing = missing_slots(slots, &plan.tasks);

        let (missing, questions) = match &self.llm {
            Some(llm) => match self.model_gaps(llm, plan, intake, slots).await {
                Ok(output) => {
                    debug!(
                        missing = output.missing_details.len(),
                        questions = output.questions.len(),
                        "refinement: model gap analysis accepted"
                    );
                    // The model can narrow the gap list (a detail may be
                    // implied by a description) but never widen it beyond
                    // what the slot scan found absent.
                    let missing: Vec<String> = output
                        .missing_details
                        .into_iter()
                        .filter(|slot| locally_missing.iter().any(|m| m == slot))
                        .collect();
                    (missing, output.questions)
                }
                Err(e) => {
                    warn!(error = %e, "refinement: model gap analysis failed, using rules");
                    let questions = rule_questions(&locally_missing, intake.category);
                    (locally_missing, questions)
                }
            },
            None => {
                let questions = rule_questions(&locally_missing, intake.category);
                (locally_missing, questions)
            }
        };

        self.assemble(plan, intake, missing, questions)
    }

    /// Rule-based refinement, used directly by the coordinator's
    /// degradation path
    pub fn rule_based(&self, plan: &Plan, intake: &IntakeResult) -> RefinementResult {
        let slots = required_slots(intake.category);
        let missing = missing_slots(slots, &plan.tasks);
        let questions = rule_questions(&missing, intake.category);
        self.assemble(plan, intake, missing, questions)
    }

    /// Ask the model which slots are missing and what to ask about them
    async fn model_gaps(
        &self,
        llm: &Arc<dyn LlmClient>,
        plan: &Plan,
        intake: &IntakeResult,
        slots: &[&str],
    ) -> Result<RefinementOutput, LlmError> {
        let plan_json = serde_json::to_string_pretty(plan)?;
        let (system_prompt, user) = self
            .prompts
            .render_refinement(&RefinementContext {
                user_input: &intake.user_input,
                category: intake.category.to_string(),
                slots: slots.join(", "),
                plan_json,
            })
            .map_err(|e| LlmError::Unavailable(e.to_string()))?;

        let request = CompletionRequest {
            system_prompt,
            messages: vec![Message::user(user)],
            max_tokens: self.max_tokens,
        };

        let response = complete_with_retry(llm, request, &self.retry).await?;
        let output: RefinementOutput = serde_json::from_value(response.json_payload()?)
            .map_err(|e| LlmError::MalformedOutput(format!("bad refinement shape: {}", e)))?;

        if let Some(unknown) = output.missing_details.iter().find(|slot| !slots.contains(&slot.as_str())) {
            return Err(LlmError::MalformedOutput(format!(
                "missing_details names a slot outside the category vocabulary: {}",
                unknown
            )));
        }

        Ok(output)
    }

    /// Build the result: append gathering tasks for the gaps, cap the
    /// questions, score the augmented plan
    fn assemble(
        &self,
        plan: &Plan,
        intake: &IntakeResult,
        missing: Vec<String>,
        mut questions: Vec<String>,
    ) -> RefinementResult {
        let mut refined = plan.clone();

        for slot in &missing {
            if has_gatherer(&refined.tasks, slot) {
                continue;
            }
            refined.tasks.push(
                Task::new(
                    format!("Gather missing detail: {}", slot),
                    Priority::High,
                    TaskCategory::DetailGathering,
                )
                .with_detail(TARGET_DETAIL_KEY, slot.clone())
                .with_detail("estimated_time", "30 minutes"),
            );
        }

        questions.truncate(self.max_questions);

        let score = completeness_score(required_slots(intake.category), &refined.tasks);
        RefinementResult::new(refined, questions, missing, score)
    }
}

/// Required detail slots per request category
pub fn required_slots(category: RequestCategory) -> &'static [&'static str] {
    match category {
        RequestCategory::Planning => &["timeline", "resources", "stakeholders", "success_criteria"],
        RequestCategory::ProblemSolving => &["problem_definition", "constraints", "success_metrics", "alternatives"],
        RequestCategory::Project => &["requirements", "deliverables", "timeline", "budget", "team"],
        RequestCategory::Event => &["date", "time", "location", "attendee_list"],
        RequestCategory::General => &["objectives", "constraints", "success_criteria"],
    }
}

/// Fraction of required slots populated by at least one task's details
///
/// A category with no required slots is trivially complete. Appended
/// gathering tasks do not populate slots (they record their target under
/// a different key), so the score is stable across repeated refinement.
pub fn completeness_score(slots: &[&str], tasks: &[Task]) -> f64 {
    if slots.is_empty() {
        return 1.0;
    }
    let populated = slots
        .iter()
        .filter(|slot| tasks.iter().any(|t| t.has_detail(slot)))
        .count();
    populated as f64 / slots.len() as f64
}

/// Slots not populated by any task, in category vocabulary order
fn missing_slots(slots: &[&str], tasks: &[Task]) -> Vec<String> {
    slots
        .iter()
        .filter(|slot| !tasks.iter().any(|t| t.has_detail(slot)))
        .map(|s| s.to_string())
        .collect()
}

/// Template questions for the rule-based path
fn rule_questions(missing: &[String], category: RequestCategory) -> Vec<String> {
    missing
        .iter()
        .map(|slot| format!("What is the {} for this {}?", slot.replace('_', " "), category_noun(category)))
        .collect()
}

fn category_noun(category: RequestCategory) -> &'static str {
    match category {
        RequestCategory::Planning => "plan",
        RequestCategory::ProblemSolving => "problem",
        RequestCategory::Project => "project",
        RequestCategory::Event => "event",
        RequestCategory::General => "request",
    }
}

/// Whether a gathering task for this slot is already in the plan
fn has_gatherer(tasks: &[Task], slot: &str) -> bool {
    tasks
        .iter()
        .any(|t| t.category.is_detail_gathering() && t.details.get(TARGET_DETAIL_KEY).is_some_and(|v| v == slot))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::client::mock::MockLlmClient;

    fn intake(category: RequestCategory) -> IntakeResult {
        IntakeResult::new(category, "ack", "plan a conference")
    }

    fn stage(llm: Option<Arc<dyn LlmClient>>) -> RefinementStage {
        RefinementStage::new(llm, Arc::new(PromptRenderer::new().unwrap()), &Config::default())
    }

    fn bare_plan() -> Plan {
        Plan::new(vec![
            Task::new("Book a venue", Priority::High, TaskCategory::Event),
            Task::new("Send invitations", Priority::Medium, TaskCategory::Event),
        ])
    }

    #[tokio::test]
    async fn test_refine_without_model_finds_all_gaps() {
        let stage = stage(None);
        let plan = bare_plan();
        let result = stage.refine(&plan, &intake(RequestCategory::Event)).await;

        assert_eq!(result.missing_details, vec!["date", "time", "location", "attendee_list"]);
        assert_eq!(result.questions.len(), 4);
        assert_eq!(result.completeness_score, 0.0);
        // One gathering task appended per gap, original tasks untouched
        assert_eq!(result.refined_plan.task_count(), plan.task_count() + 4);
        assert_eq!(result.refined_plan.tasks[0].task_id, plan.tasks[0].task_id);
        assert_eq!(result.refined_plan.tasks[1].task_id, plan.tasks[1].task_id);
    }

    #[tokio::test]
    async fn test_refine_partial_coverage() {
        let stage = stage(None);
        let plan = Plan::new(vec![
            Task::new("Book a venue", Priority::High, TaskCategory::Event)
                .with_detail("location", "HQ, room 4")
                .with_detail("date", "2026-09-12"),
        ]);
        let result = stage.refine(&plan, &intake(RequestCategory::Event)).await;

        assert_eq!(result.missing_details, vec!["time", "attendee_list"]);
        assert_eq!(result.completeness_score, 0.5);
    }

    #[tokio::test]
    async fn test_refine_is_idempotent() {
        let stage = stage(None);
        let first = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;
        let second = stage.refine(&first.refined_plan, &intake(RequestCategory::Event)).await;

        assert_eq!(second.refined_plan.task_count(), first.refined_plan.task_count());
        assert_eq!(second.completeness_score, first.completeness_score);
        assert_eq!(second.missing_details, first.missing_details);
    }

    #[tokio::test]
    async fn test_gathering_tasks_are_high_priority() {
        let stage = stage(None);
        let result = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;

        let gatherers: Vec<&Task> = result
            .refined_plan
            .tasks
            .iter()
            .filter(|t| t.category.is_detail_gathering())
            .collect();
        assert_eq!(gatherers.len(), 4);
        for task in gatherers {
            assert_eq!(task.priority, Priority::High);
            assert!(task.has_detail(TARGET_DETAIL_KEY));
            assert_eq!(task.details["estimated_time"], "30 minutes");
        }
    }

    #[tokio::test]
    async fn test_model_narrows_but_cannot_widen_gaps() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"missing_details": ["date", "location"], "questions": ["When should it happen?", "Where should it be held?"]}"#,
        ]));
        let stage = stage(Some(llm));
        let result = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;

        assert_eq!(result.missing_details, vec!["date", "location"]);
        assert_eq!(result.questions.len(), 2);
        // Score still counts all four slots, not just the model's two
        assert_eq!(result.completeness_score, 0.0);
    }

    #[tokio::test]
    async fn test_model_unknown_slot_falls_back() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::with_texts(vec![
            r#"{"missing_details": ["vibe"], "questions": ["What's the vibe?"]}"#,
        ]));
        let stage = stage(Some(llm));
        let result = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;

        // Rule-based output, not the model's
        assert_eq!(result.missing_details, vec!["date", "time", "location", "attendee_list"]);
    }

    #[tokio::test]
    async fn test_model_failure_falls_back() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::unavailable());
        let stage = stage(Some(llm));
        let result = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;
        assert_eq!(result.missing_details.len(), 4);
    }

    #[tokio::test]
    async fn test_questions_capped_at_max() {
        let mut config = Config::default();
        config.pipeline.max_questions = 2;
        let stage = RefinementStage::new(None, Arc::new(PromptRenderer::new().unwrap()), &config);

        let result = stage.refine(&bare_plan(), &intake(RequestCategory::Event)).await;
        assert_eq!(result.questions.len(), 2);
        // The gap list itself is not capped
        assert_eq!(result.missing_details.len(), 4);
    }

    #[test]
    fn test_completeness_score_bounds() {
        assert_eq!(completeness_score(&[], &[]), 1.0);

        let slots = required_slots(RequestCategory::Project);
        assert_eq!(completeness_score(slots, &[]), 0.0);

        let full = Task::new("t", Priority::Medium, TaskCategory::Project)
            .with_detail("requirements", "x")
            .with_detail("deliverables", "x")
            .with_detail("timeline", "x")
            .with_detail("budget", "x")
            .with_detail("team", "x");
        assert_eq!(completeness_score(slots, std::slice::from_ref(&full)), 1.0);
    }

    #[test]
    fn test_rule_question_phrasing() {
        let questions = rule_questions(&["attendee_list".to_string()], RequestCategory::Event);
        assert_eq!(questions, vec!["What is the attendee list for this event?"]);
    }

    #[test]
    fn test_rule_based_matches_no_model_refine() {
        let stage = stage(None);
        let plan = bare_plan();
        let result = stage.rule_based(&plan, &intake(RequestCategory::Event));
        assert_eq!(result.missing_details.len(), 4);
        assert_eq!(result.completeness_score, 0.0);
    }
}
