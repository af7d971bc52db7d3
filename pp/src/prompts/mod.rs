//! Prompt rendering
//!
//! Wraps a Handlebars registry around the embedded templates. Each stage
//! gets a `(system, user)` prompt pair rendered from its context.

use eyre::{Context, Result};
use handlebars::Handlebars;
use serde::Serialize;

mod embedded;

/// Context for the intake categorization prompt
#[derive(Debug, Serialize)]
pub struct IntakeContext<'a> {
    pub user_input: &'a str,
}

/// Context for the plan generation prompt
#[derive(Debug, Serialize)]
pub struct PlanningContext<'a> {
    pub user_input: &'a str,
    pub category: String,
}

/// Context for the refinement prompt
#[derive(Debug, Serialize)]
pub struct RefinementContext<'a> {
    pub user_input: &'a str,
    pub category: String,
    /// Comma-separated required slot names
    pub slots: String,
    pub plan_json: String,
}

/// Renders stage prompts from the embedded templates
pub struct PromptRenderer {
    registry: Handlebars<'static>,
}

impl PromptRenderer {
    /// Build a renderer with all stage templates registered
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        // Prompts are plain text for the model, not HTML
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string("intake_user", embedded::INTAKE_USER)
            .context("Failed to register intake template")?;
        registry
            .register_template_string("planning_user", embedded::PLANNING_USER)
            .context("Failed to register planning template")?;
        registry
            .register_template_string("refinement_user", embedded::REFINEMENT_USER)
            .context("Failed to register refinement template")?;

        Ok(Self { registry })
    }

    /// Render the intake categorization prompt pair
    pub fn render_intake(&self, ctx: &IntakeContext<'_>) -> Result<(String, String)> {
        let user = self
            .registry
            .render("intake_user", ctx)
            .context("Failed to render intake prompt")?;
        Ok((embedded::INTAKE_SYSTEM.to_string(), user))
    }

    /// Render the plan generation prompt pair
    pub fn render_planning(&self, ctx: &PlanningContext<'_>) -> Result<(String, String)> {
        let user = self
            .registry
            .render("planning_user", ctx)
            .context("Failed to render planning prompt")?;
        Ok((embedded::PLANNING_SYSTEM.to_string(), user))
    }

    /// Render the refinement prompt pair
    pub fn render_refinement(&self, ctx: &RefinementContext<'_>) -> Result<(String, String)> {
        let user = self
            .registry
            .render("refinement_user", ctx)
            .context("Failed to render refinement prompt")?;
        Ok((embedded::REFINEMENT_SYSTEM.to_string(), user))
    }
}
