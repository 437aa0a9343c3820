use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use tracing::{debug, info, warn};

use planwright::cli::{Cli, Command};
use planwright::config::Config;
use planwright::llm::{CompletionRequest, create_client};
use planwright::plan::PlanGenerator;
use planwright::prompts::{PromptLoader, embedded};
use planwright::server::{self, AppState};

/// Tokens allowed for a probe reply
const PROBE_MAX_TOKENS: u32 = 64;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Determine log level with priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    // stdout carries command output, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .try_init()
        .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

    debug!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // API keys may live in a .env file
    dotenvy::dotenv().ok();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!(
        "Planwright loaded config: provider={} model={} fallback={}",
        config.llm.provider, config.llm.model, config.llm.fallback_model
    );

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Serve { bind } => {
            debug!(?bind, "main: matched Serve command");
            cmd_serve(&config, bind).await
        }
        Command::Generate {
            description,
            deadline,
            pretty,
        } => {
            debug!(%deadline, pretty, "main: matched Generate command");
            cmd_generate(&config, &description, &deadline, pretty).await
        }
        Command::Models => {
            debug!("main: matched Models command");
            cmd_models(&config).await
        }
        Command::Probe { models } => {
            debug!(?models, "main: matched Probe command");
            cmd_probe(&config, models).await
        }
    }
}

/// Run the HTTP service
async fn cmd_serve(config: &Config, bind: Option<String>) -> Result<()> {
    debug!("cmd_serve: called");
    config.validate()?;
    let state = AppState::from_config(config)?;
    let bind = bind.unwrap_or_else(|| config.server.bind.clone());
    server::serve(state, &bind, config.server.cors).await
}

/// Generate a single plan and print it
async fn cmd_generate(config: &Config, description: &str, deadline: &str, pretty: bool) -> Result<()> {
    debug!("cmd_generate: called");
    if description.trim().is_empty() || deadline.trim().is_empty() {
        return Err(eyre!("Missing input"));
    }
    config.validate()?;

    let base = std::env::current_dir().context("Failed to read current directory")?;
    let generator =
        PlanGenerator::from_config(&config.llm, PromptLoader::new(base)).context("Failed to create LLM client")?;

    let (body, outcome) = match generator.generate(description, deadline).await {
        Ok(generation) => {
            if generation.used_fallback() {
                warn!(model = %generation.model, "Plan produced by fallback model");
            }
            (serde_json::to_value(&generation.plan)?, Ok(()))
        }
        Err(e) => (
            serde_json::json!({ "error": e.to_string() }),
            Err(eyre!("Plan generation failed ({})", e.kind())),
        ),
    };

    let text = if pretty {
        serde_json::to_string_pretty(&body)?
    } else {
        serde_json::to_string(&body)?
    };
    println!("{}", text);
    outcome
}

/// List generation-capable models
async fn cmd_models(config: &Config) -> Result<()> {
    debug!("cmd_models: called");
    config.validate()?;
    let client = create_client(&config.llm)?;
    let models = client.list_models().await?;

    println!("Available models ({}):", config.llm.provider);
    for model in &models {
        println!("  {}", model);
    }
    if models.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    Ok(())
}

/// Check which models answer a trivial prompt
async fn cmd_probe(config: &Config, models: Vec<String>) -> Result<()> {
    debug!("cmd_probe: called");
    config.validate()?;
    let client = create_client(&config.llm)?;
    let models = if models.is_empty() { config.llm.model_chain() } else { models };

    let mut failures = 0;
    for model in &models {
        let request = CompletionRequest::new(model.as_str(), embedded::PROBE, PROBE_MAX_TOKENS);
        match client.complete(request).await {
            Ok(response) => {
                let reply = response.text_content().unwrap_or("").trim().to_string();
                println!("{} {} - {}", "SUCCESS".green().bold(), model, reply);
            }
            Err(e) => {
                failures += 1;
                println!("{} {} - {}", "FAILED".red().bold(), model, e);
            }
        }
    }

    if failures == models.len() {
        return Err(eyre!("No model responded"));
    }
    Ok(())
}
