//! CLI command definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// PlanPipe - structured action plans from free-text requests
#[derive(Parser)]
#[command(
    name = "pp",
    about = "Turn a free-text request into a structured, actionable plan",
    version,
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Skip the model entirely and run rule-based
    #[arg(long, global = true, help = "Disable the LLM and run rule-based only")]
    pub no_llm: bool,

    /// Verbose logging (DEBUG level)
    #[arg(short, long, global = true, help = "Enable debug logging")]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Process one request and print the result
    Run {
        /// The request text
        #[arg(value_name = "TEXT")]
        text: String,

        /// Output format
        #[arg(short, long, default_value = "json")]
        format: OutputFormat,
    },

    /// Run the canned demo requests through the pipeline
    Demo,

    /// Print the effective configuration
    Config,
}

/// Output format for the run command
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Json,
    Summary,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "summary" | "text" => Ok(Self::Summary),
            _ => Err(format!("Unknown format: {}. Use: json or summary", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json => write!(f, "json"),
            Self::Summary => write!(f, "summary"),
        }
    }
}
