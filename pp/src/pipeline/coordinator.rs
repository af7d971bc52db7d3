//! Coordinator - drives the stages and assembles the final result
//!
//! Owns the three stages and runs them in fixed order: intake, planning,
//! refinement, then consolidation. Data flows strictly forward. If a stage
//! errors despite its internal fallbacks, the coordinator substitutes that
//! stage's rule-based output and continues; only empty input aborts the
//! run.

use std::sync::Arc;

use eyre::Result;
use tracing::{debug, info, warn};

use super::error::PipelineError;
use super::intake::IntakeStage;
use super::planning::PlanningStage;
use super::refinement::RefinementStage;
use crate::config::{Config, PipelineConfig};
use crate::domain::{Action, ActionType, FinalResult, IntakeResult, Priority, RefinementResult};
use crate::llm::LlmClient;
use crate::prompts::PromptRenderer;

/// Pipeline coordinator
pub struct Coordinator {
    intake: IntakeStage,
    planning: PlanningStage,
    refinement: RefinementStage,
    config: PipelineConfig,
}

impl Coordinator {
    /// Build a coordinator, sharing one client and renderer across stages
    ///
    /// `llm: None` runs the whole pipeline rule-based.
    pub fn new(llm: Option<Arc<dyn LlmClient>>, config: &Config) -> Result<Self> {
        let prompts = Arc::new(PromptRenderer::new()?);
        Ok(Self {
            intake: IntakeStage::new(llm.clone(), prompts.clone(), config),
            planning: PlanningStage::new(llm.clone(), prompts.clone(), config),
            refinement: RefinementStage::new(llm, prompts, config),
            config: config.pipeline.clone(),
        })
    }

    /// Run the full pipeline on one request
    pub async fn process_user_request(&self, request_text: &str) -> Result<FinalResult, PipelineError> {
        let text = request_text.trim();
        if text.is_empty() {
            return Err(PipelineError::InvalidInput(
                "request text is empty or whitespace-only".to_string(),
            ));
        }

        info!(chars = text.len(), "pipeline: processing request");

        let intake = match self.intake.process(text).await {
            Ok(result) => result,
            Err(e @ PipelineError::InvalidInput(_)) => return Err(e),
            Err(e) => {
                warn!(error = %e, "pipeline: intake errored, substituting rule-based intake");
                self.intake.rule_based(text)
            }
        };
        debug!(category = %intake.category, "pipeline: intake complete");

        let plan = match self.planning.create_plan(&intake).await {
            Ok(plan) => plan,
            Err(PipelineError::PlanValidation(msg)) => {
                // The fallback itself is broken; nothing left to degrade to.
                return Err(PipelineError::PlanValidation(msg));
            }
            Err(e) => {
                warn!(error = %e, "pipeline: planning errored, substituting template plan");
                self.planning.fallback_plan(&intake)?
            }
        };
        debug!(tasks = plan.task_count(), "pipeline: planning complete");

        let refinement = self.refinement.refine(&plan, &intake).await;
        debug!(
            score = refinement.completeness_score,
            questions = refinement.questions.len(),
            "pipeline: refinement complete"
        );

        let action_plan = self.build_actions(&refinement);
        let summary = self.build_summary(&intake, &refinement);
        let recommendations = self.build_recommendations(&refinement);

        info!(
            actions = action_plan.len(),
            recommendations = recommendations.len(),
            "pipeline: request processed"
        );

        Ok(FinalResult::new(
            text,
            intake,
            plan,
            refinement,
            summary,
            action_plan,
            recommendations,
        ))
    }

    /// One clarification action per question first, then one action per
    /// refined task. `|actions| == |questions| + |tasks|` always holds.
    fn build_actions(&self, refinement: &RefinementResult) -> Vec<Action> {
        let mut actions =
            Vec::with_capacity(refinement.questions.len() + refinement.refined_plan.task_count());

        for question in &refinement.questions {
            actions.push(Action::new(ActionType::Clarification, question.clone(), Priority::High));
        }

        for task in &refinement.refined_plan.tasks {
            let action_type = if task.category.is_detail_gathering() {
                ActionType::DetailGathering
            } else {
                ActionType::TaskExecution
            };

            let mut action = Action::new(action_type, task.description.clone(), task.priority)
                .with_detail("task_id", task.task_id.clone())
                .with_detail("category", task.category.to_string());
            if let Some(estimate) = task.details.get("estimated_time") {
                action = action.with_detail("estimated_time", estimate.clone());
            }
            if let Some(target) = task.details.get("target_detail") {
                action = action.with_detail("target_detail", target.clone());
            }
            actions.push(action);
        }

        actions
    }

    fn build_summary(&self, intake: &IntakeResult, refinement: &RefinementResult) -> String {
        format!(
            "Categorized as {} with {} task(s); completeness {:.0}% with {} open question(s).",
            intake.category,
            refinement.refined_plan.task_count(),
            refinement.completeness_score * 100.0,
            refinement.questions.len(),
        )
    }

    fn build_recommendations(&self, refinement: &RefinementResult) -> Vec<String> {
        let mut recommendations = Vec::new();

        if refinement.completeness_score < self.config.completeness_threshold {
            recommendations.push("Gather more details before proceeding".to_string());
        }
        if refinement.refined_plan.task_count() > self.config.phase_task_threshold {
            recommendations.push("Consider breaking this into phases".to_string());
        }
        if !refinement.questions.is_empty() {
            recommendations.push("Answer the clarifying questions to improve the plan".to_string());
        }

        recommendations
    }
}
