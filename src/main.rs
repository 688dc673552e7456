//! model-integrator CLI
//!
//! Route prompts across OpenAI, Groq, Gemini and Grok from the command line.

use clap::Parser;

use model_integrator::cli::{execute, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    execute(cli).await
}
