//! CLI command implementations

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use futures::StreamExt;

use crate::config::{IntegratorConfig, Provider};
use crate::registry::{ModelRegistry, ModelSelector, Strategy};
use crate::tracking::UsageLedger;
use crate::telemetry::init_telemetry;
use crate::{GenerationRequest, GenerationResult, StreamEvent, UnifiedIntegrator, VERSION};

use super::{
    Cli, Commands, ConfigAction, ConfigCommand, GenerateCommand, ModelsCommand, OutputFormat, SelectCommand,
    UsageCommand,
};

/// Execute the CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    let mut config = IntegratorConfig::load(cli.config.as_deref())?;

    if let Some(level) = cli.log_level {
        config.telemetry.log_level = level;
    }
    if cli.json_logs {
        config.telemetry.json_logs = true;
    }

    let _guard = init_telemetry(&config.telemetry)?;

    match cli.command {
        Commands::Generate(cmd) => execute_generate(cmd, config).await,
        Commands::Models(cmd) => execute_models(cmd, config),
        Commands::Select(cmd) => execute_select(cmd, config),
        Commands::Usage(cmd) => execute_usage(cmd, config),
        Commands::Config(cmd) => execute_config(cmd, config),
        Commands::Version => execute_version(),
    }
}

async fn execute_generate(cmd: GenerateCommand, mut config: IntegratorConfig) -> Result<()> {
    if let Some(strategy) = cmd.strategy {
        config.strategy = strategy;
    }

    let integrator = UnifiedIntegrator::from_config(&config).context("Failed to build integrator")?;
    if integrator.registry().is_empty() {
        bail!("No models configured; set at least one of OPENAI_API_KEY, GROQ_API_KEY, GEMINI_API_KEY, GROK_API_KEY");
    }

    let mut request = GenerationRequest::new(cmd.prompt);
    request.system_prompt = cmd.system;
    request.model_id = cmd.model;
    request.temperature = cmd.temperature;
    request.max_tokens = cmd.max_tokens;
    request.client_request_id = cmd.request_id;

    let result = if cmd.stream && cmd.format == OutputFormat::Text {
        stream_to_stdout(&integrator, request, cmd.chunk_size).await?
    } else {
        let result = integrator.generate(request).await;
        print_result(&result, cmd.format)?;
        result
    };

    if cmd.save_usage {
        let path = config
            .usage_file
            .as_ref()
            .context("--save-usage needs a usage file (MODEL_INTEGRATOR_USAGE_FILE)")?;
        integrator.save_usage(path)?;
        eprintln!("Usage saved to {}", path.display());
    }

    if !result.success {
        bail!("Generation failed: {}", result.error.as_deref().unwrap_or("unknown error"));
    }
    Ok(())
}

async fn stream_to_stdout(
    integrator: &UnifiedIntegrator,
    request: GenerationRequest,
    chunk_size: usize,
) -> Result<GenerationResult> {
    let stream = integrator.generate_stream(request, chunk_size);
    futures::pin_mut!(stream);

    let mut stdout = io::stdout();
    while let Some(event) = stream.next().await {
        match event {
            StreamEvent::Chunk(chunk) => {
                write!(stdout, "{}", chunk)?;
                stdout.flush()?;
            }
            StreamEvent::Done(result) => {
                writeln!(stdout)?;
                if result.success {
                    print_footer(&result);
                }
                return Ok(*result);
            }
        }
    }
    bail!("Stream ended without a result")
}

fn print_result(result: &GenerationResult, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(result)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(result)?),
        OutputFormat::Text => {
            if result.success {
                println!("{}", result.text());
                print_footer(result);
            }
        }
    }
    Ok(())
}

fn print_footer(result: &GenerationResult) {
    eprintln!();
    eprintln!(
        "  {} · {} in / {} out{} · ${:.6} · {:.2}s",
        result.model_key.as_deref().unwrap_or("-"),
        result.input_tokens,
        result.output_tokens,
        if result.tokens_estimated { " (estimated)" } else { "" },
        result.cost,
        result.response_time,
    );
    if let Some(from) = &result.fallback_from {
        eprintln!("  fallback from {}", from);
    }
    for warning in &result.rate_limit_warnings {
        eprintln!("  warning: {}", warning);
    }
}

fn execute_models(cmd: ModelsCommand, config: IntegratorConfig) -> Result<()> {
    let provider: Option<Provider> = cmd
        .provider
        .as_deref()
        .map(str::parse)
        .transpose()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let integrator = UnifiedIntegrator::from_config(&config)?;
    let models: Vec<_> = integrator
        .available_models()
        .into_iter()
        .filter(|m| provider.map_or(true, |p| m.provider == p))
        .collect();

    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&models)?),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&models)?),
        OutputFormat::Text => {
            if models.is_empty() {
                println!("No models configured.");
                return Ok(());
            }
            println!(
                "{:<36} {:<8} {:>10} {:>10} {:>6} {:>8} {:>7}",
                "MODEL", "PROVIDER", "IN/1K", "OUT/1K", "SPEED", "QUALITY", "SCORE"
            );
            println!("{}", "-".repeat(91));
            for m in models {
                println!(
                    "{:<36} {:<8} {:>10.5} {:>10.5} {:>6} {:>8} {:>7.3}",
                    m.key, m.provider, m.cost_per_1k_input, m.cost_per_1k_output, m.speed_rating, m.quality_rating, m.score
                );
            }
            println!();
            println!("Strategy: {}", integrator.strategy());
        }
    }
    Ok(())
}

fn execute_select(cmd: SelectCommand, config: IntegratorConfig) -> Result<()> {
    let integrator = UnifiedIntegrator::from_config(&config)?;
    let registry = integrator.registry();
    let strategies: Vec<Strategy> = match cmd.strategy {
        Some(strategy) => vec![strategy],
        None => Strategy::ALL.to_vec(),
    };

    for strategy in strategies {
        if cmd.all {
            println!("{}:", strategy);
            for (rank, (key, score)) in ModelSelector::ranking(registry, strategy).iter().enumerate() {
                println!("  {:>2}. {:<36} {:.3}", rank + 1, key, score);
            }
        } else {
            let choice = ModelSelector::select(registry, strategy);
            println!("{:<9} {}", strategy, choice.as_deref().unwrap_or("(no model available)"));
        }
    }
    Ok(())
}

fn execute_usage(cmd: UsageCommand, config: IntegratorConfig) -> Result<()> {
    let path: PathBuf = match cmd.file.or_else(|| config.usage_file.clone()) {
        Some(path) => path,
        None => bail!("No usage file given; pass --file or set MODEL_INTEGRATOR_USAGE_FILE"),
    };

    let ledger = UsageLedger::for_registry(&ModelRegistry::load(&config));
    let loaded = ledger
        .load(&path)
        .with_context(|| format!("Failed to read usage file {}", path.display()))?;

    let stats = ledger.snapshot();
    let summary = ledger.summary();

    match cmd.format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "models": stats, "summary": summary }))?
        ),
        OutputFormat::Yaml => println!("{}", serde_yaml::to_string(&stats)?),
        OutputFormat::Text => {
            println!("{} entries loaded from {}", loaded, path.display());
            println!();
            println!(
                "{:<36} {:>8} {:>7} {:>10} {:>10} {:>12} {:>8}",
                "MODEL", "REQUESTS", "ERRORS", "IN TOK", "OUT TOK", "COST ($)", "AVG (s)"
            );
            println!("{}", "-".repeat(97));
            for (key, s) in &stats {
                println!(
                    "{:<36} {:>8} {:>7} {:>10} {:>10} {:>12.6} {:>8.2}",
                    key, s.requests, s.errors, s.total_input_tokens, s.total_output_tokens, s.total_cost, s.avg_response_time
                );
            }
            println!();
            println!("Total cost:     ${:.6}", summary.total_cost);
            println!("Most used:      {}", summary.most_used_model.as_deref().unwrap_or("-"));
            println!("Most expensive: {}", summary.most_expensive_model.as_deref().unwrap_or("-"));
        }
    }
    Ok(())
}

fn execute_config(cmd: ConfigCommand, config: IntegratorConfig) -> Result<()> {
    match cmd.action {
        ConfigAction::Show { format } => {
            let output = match format.as_str() {
                "toml" => toml::to_string_pretty(&config)?,
                "json" => serde_json::to_string_pretty(&config)?,
                _ => serde_yaml::to_string(&config)?,
            };
            println!("{}", output);
            Ok(())
        }

        ConfigAction::Validate { file } => match IntegratorConfig::from_file(&file) {
            Ok(config) => {
                println!("✓ Configuration is valid");
                println!("  Strategy:  {}", config.strategy);
                println!(
                    "  Providers: {}",
                    config
                        .configured_providers()
                        .iter()
                        .map(|p| p.as_str())
                        .collect::<Vec<_>>()
                        .join(", ")
                );
                Ok(())
            }
            Err(e) => bail!("✗ Configuration is invalid: {}", e),
        },

        ConfigAction::Env => {
            println!("Environment Variables:");
            println!();
            for provider in Provider::ALL {
                let prefix = provider.env_prefix();
                println!("  {}_API_KEY     API key; enables the provider", prefix);
                println!("  {}_MODELS      Comma-separated model names", prefix);
                println!("  {}_BASE_URL    Endpoint override", prefix);
            }
            println!("  OPENAI_ORGANIZATION            OpenAI organization id");
            println!("  OPENAI_PROJECT                 OpenAI project id");
            println!("  MODEL_STRATEGY                 cost | speed | quality | balanced");
            println!("  MODEL_INTEGRATOR_CONFIG        Configuration file path");
            println!("  MODEL_INTEGRATOR_USAGE_FILE    Usage statistics file");
            println!("  MODEL_INTEGRATOR_TIMEOUT_SECS  HTTP request timeout");
            println!("  MODEL_INTEGRATOR_TRACKER_CAPACITY  Stored request records");
            println!("  MODEL_INTEGRATOR_LOG_LEVEL     Log level or filter");
            println!("  MODEL_INTEGRATOR_JSON_LOGS     true for JSON logs");
            println!("  MODEL_INTEGRATOR_LOG_FILE      Write logs to this file");
            Ok(())
        }
    }
}

fn execute_version() -> Result<()> {
    println!("model-integrator {}", VERSION);
    println!();
    println!("Providers: {}", Provider::ALL.map(|p| p.as_str()).join(", "));
    println!(
        "Strategies: {}",
        Strategy::ALL.map(|s| s.to_string()).join(", ")
    );
    Ok(())
}
