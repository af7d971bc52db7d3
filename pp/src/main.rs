//! PlanPipe CLI entry point

use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use eyre::{Context, Result};
use tracing::{debug, info};

use planpipe::cli::{Cli, Command, OutputFormat};
use planpipe::config::Config;
use planpipe::domain::FinalResult;
use planpipe::llm::{LlmClient, create_client};
use planpipe::pipeline::{Coordinator, PipelineError};

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    let llm = build_client(&config, cli.no_llm);
    let coordinator = Coordinator::new(llm, &config).context("Failed to build pipeline")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Run { text, format } => cmd_run(&coordinator, &text, format).await,
        Command::Demo => cmd_demo(&coordinator).await,
        Command::Config => cmd_config(&config),
    }
}

/// Create the LLM client if enabled and available
///
/// Absence is non-fatal: the pipeline runs rule-based without one.
fn build_client(config: &Config, no_llm: bool) -> Option<Arc<dyn LlmClient>> {
    if no_llm || !config.pipeline.enable_llm {
        info!("LLM disabled, running rule-based");
        return None;
    }

    match create_client(&config.llm) {
        Ok(client) => {
            debug!(provider = %config.llm.provider, model = %config.llm.model, "main: LLM client created");
            Some(client)
        }
        Err(e) => {
            info!("LLM client not available ({}), running rule-based", e);
            None
        }
    }
}

/// Process one request and print the result
async fn cmd_run(coordinator: &Coordinator, text: &str, format: OutputFormat) -> Result<()> {
    debug!(chars = text.len(), %format, "cmd_run: called");

    let result = match coordinator.process_user_request(text).await {
        Ok(result) => result,
        Err(PipelineError::InvalidInput(msg)) => {
            eprintln!("{} {}", "error:".red().bold(), msg);
            std::process::exit(2);
        }
        Err(e) => return Err(e.into()),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Summary => print_summary(&result),
    }

    Ok(())
}

/// Run the canned demo requests
async fn cmd_demo(coordinator: &Coordinator) -> Result<()> {
    debug!("cmd_demo: called");
    let requests = [
        "I need to organize a team meeting for next week",
        "Help me solve issues with our customer service response time",
        "I want to build a mobile app for our business",
        "Plan the rollout of our new onboarding process",
    ];

    for (i, request) in requests.iter().enumerate() {
        println!("{}", format!("=== Demo {} ===", i + 1).bold());
        println!("{} {}", "Request:".bold(), request);
        println!();

        match coordinator.process_user_request(request).await {
            Ok(result) => print_summary(&result),
            Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
        }
        println!();
    }

    Ok(())
}

/// Print the effective configuration
fn cmd_config(config: &Config) -> Result<()> {
    debug!("cmd_config: called");
    println!("{}", serde_yaml::to_string(config)?);
    Ok(())
}

/// Human-readable digest of a final result
fn print_summary(result: &FinalResult) {
    println!("{} {}", "Category:".bold(), result.intake_output.category);
    println!("{} {}", "Summary:".bold(), result.summary);
    println!(
        "{} {:.0}%",
        "Completeness:".bold(),
        result.refinement_output.completeness_score * 100.0
    );

    if !result.refinement_output.questions.is_empty() {
        println!("{}", "Questions:".bold());
        for question in &result.refinement_output.questions {
            println!("  - {}", question);
        }
    }

    println!("{}", "Actions:".bold());
    for action in &result.action_plan {
        let tag = match action.action_type {
            planpipe::domain::ActionType::Clarification => "clarify".yellow(),
            planpipe::domain::ActionType::TaskExecution => "execute".green(),
            planpipe::domain::ActionType::DetailGathering => "gather".cyan(),
        };
        println!("  [{}] {} ({})", tag, action.description, action.priority);
    }

    if !result.recommendations.is_empty() {
        println!("{}", "Recommendations:".bold());
        for recommendation in &result.recommendations {
            println!("  - {}", recommendation);
        }
    }
}
