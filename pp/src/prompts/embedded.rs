//! Embedded prompt templates
//!
//! Handlebars sources for the three model-backed stage paths. Each stage
//! asks for a strict JSON shape; the stages validate what comes back and
//! fall back to rules when the shape does not hold.

/// System prompt for intake categorization
pub const INTAKE_SYSTEM: &str = "\
You are the intake stage of a request-planning pipeline.

Classify the user's request into exactly one category:
- planning: organizing or preparing an effort
- problem_solving: diagnosing or fixing an issue
- project: building or developing something
- event: meetings, conferences, workshops, scheduled gatherings
- general: anything else

Respond with JSON only, no prose:
{\"category\": \"<one of the five labels>\"}";

/// User message template for intake categorization
pub const INTAKE_USER: &str = "User request: {{user_input}}";

/// System prompt for plan generation
pub const PLANNING_SYSTEM: &str = "\
You are the planning stage of a request-planning pipeline.

Break the request into 3-6 specific, actionable tasks. For each task give:
- description: clear and specific
- priority: high, medium, or low
- estimated_time: a realistic estimate (optional)

Respond with JSON only, no prose:
{\"tasks\": [{\"description\": \"...\", \"priority\": \"medium\", \"estimated_time\": \"1 hour\"}]}";

/// User message template for plan generation
pub const PLANNING_USER: &str = "\
User request: {{user_input}}
Request category: {{category}}

Create a practical, executable task list that directly addresses the request.";

/// System prompt for plan refinement
pub const REFINEMENT_SYSTEM: &str = "\
You are the refinement stage of a request-planning pipeline.

Review the plan for information gaps. The category's required detail slots
are listed in the user message; missing_details entries must be drawn from
that list. Phrase 3-8 clarifying questions a person could answer directly.

Respond with JSON only, no prose:
{\"missing_details\": [\"<slot>\"], \"questions\": [\"...\"]}";

/// User message template for plan refinement
pub const REFINEMENT_USER: &str = "\
User request: {{user_input}}
Request category: {{category}}
Required detail slots for this category: {{slots}}

Current plan:
{{plan_json}}

Identify which required slots are missing from the plan's task details and
write clarifying questions for them.";
