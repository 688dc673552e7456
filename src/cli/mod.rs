//! CLI module for the model integrator
//!
//! The binary is the composition root: it loads configuration, installs the
//! tracing subscriber, builds a `UnifiedIntegrator` and runs one subcommand.

mod commands;

pub use commands::*;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::registry::Strategy;
use crate::VERSION;

/// model-integrator: route prompts across OpenAI, Groq, Gemini and Grok
#[derive(Parser, Debug)]
#[command(name = "model-integrator")]
#[command(version = VERSION)]
#[command(about = "Multi-provider LLM routing with cost, speed and quality strategies")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path (YAML, TOML, or JSON)
    #[arg(short, long, global = true, env = "MODEL_INTEGRATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level or filter directive (overrides configuration)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Enable JSON log output
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a completion
    #[command(alias = "gen")]
    Generate(GenerateCommand),

    /// List registered models
    Models(ModelsCommand),

    /// Show which model each strategy would pick
    Select(SelectCommand),

    /// Show persisted usage statistics
    Usage(UsageCommand),

    /// Configuration management
    #[command(alias = "cfg")]
    Config(ConfigCommand),

    /// Show version information
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

/// Generate a completion
#[derive(Parser, Debug)]
pub struct GenerateCommand {
    /// User prompt
    #[arg(short, long)]
    pub prompt: String,

    /// System prompt
    #[arg(short, long)]
    pub system: Option<String>,

    /// Registry key (`provider_model`); the strategy picks one if omitted
    #[arg(short, long)]
    pub model: Option<String>,

    /// Selection strategy (cost, speed, quality, balanced)
    #[arg(long)]
    pub strategy: Option<Strategy>,

    /// Temperature (0.0-2.0)
    #[arg(short, long)]
    pub temperature: Option<f32>,

    /// Maximum tokens to generate
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Caller correlation id
    #[arg(long)]
    pub request_id: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Print the text in chunks as it is replayed
    #[arg(long)]
    pub stream: bool,

    /// Characters per streamed chunk
    #[arg(long, default_value = "24")]
    pub chunk_size: usize,

    /// Write usage statistics to the configured usage file afterwards
    #[arg(long)]
    pub save_usage: bool,
}

/// List registered models
#[derive(Parser, Debug)]
pub struct ModelsCommand {
    /// Filter by provider (openai, groq, gemini, grok)
    #[arg(short, long)]
    pub provider: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Show strategy rankings
#[derive(Parser, Debug)]
pub struct SelectCommand {
    /// Only this strategy; all four when omitted
    #[arg(short, long)]
    pub strategy: Option<Strategy>,

    /// Show the full ranking instead of the winner only
    #[arg(long)]
    pub all: bool,
}

/// Show usage statistics
#[derive(Parser, Debug)]
pub struct UsageCommand {
    /// Usage file to read (defaults to the configured one)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Configuration management
#[derive(Parser, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration (API keys are never printed)
    Show {
        /// Output format (yaml, toml, json)
        #[arg(short, long, default_value = "yaml")]
        format: String,
    },

    /// Validate a configuration file
    Validate {
        /// Configuration file to validate
        file: PathBuf,
    },

    /// Show environment variable mappings
    Env,
}
