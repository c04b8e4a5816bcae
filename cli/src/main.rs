//! CLI entrypoint for Agent Fusion
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Context, Result, anyhow, bail};
use clap::Parser;
use colored::Colorize;
use fusion_application::{LlmGateway, ProgressNotifier, RunFusionUseCase};
use fusion_domain::{ConfigIssue, OutputFormat, QueryRequest};
use fusion_infrastructure::{ConfigLoader, FileConfig, OpenAiCompatConfig, OpenAiCompatGateway};
use fusion_presentation::{ChatRepl, Cli, ConsoleFormatter, ProgressReporter, SimpleProgress};
use std::io::IsTerminal;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the guard alive so buffered file logs are flushed on exit
    let _log_guard = init_logging(cli.verbose, cli.log_dir.as_deref())?;

    info!("Starting Agent Fusion");

    if cli.show_config {
        ConfigLoader::print_config_sources(cli.config.as_ref());
        return Ok(());
    }

    // === Configuration ===
    let mut config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())
            .map_err(|e| anyhow!("Failed to load configuration: {}", e))?
    };
    apply_cli_overrides(&mut config, &cli);
    check_config(&config.validate())?;

    if !config.output.color {
        colored::control::set_override(false);
    }

    // === Dependency Injection ===
    let api_key = config.provider.resolve_api_key().ok_or_else(|| {
        anyhow!(
            "No API key found. Set the {} environment variable.",
            config.provider.api_key_env
        )
    })?;
    let gateway: Arc<dyn LlmGateway> = Arc::new(
        OpenAiCompatGateway::new(
            OpenAiCompatConfig::new(config.provider.base_url.clone(), api_key)
                .with_request_timeout(Duration::from_secs(config.provider.timeout_seconds)),
        )
        .context("Failed to initialize the provider client")?,
    );

    let format = config.output.format();
    let targets = config.reference_models();
    let aggregator = config.aggregator_model();

    // Chat mode
    if cli.chat {
        let history_path = config.repl.history_path();
        let repl = ChatRepl::new(gateway, targets, aggregator)
            .with_params(config.execution_params())
            .with_instructions(config.aggregation.instructions())
            .with_reference_options(config.reference_options())
            .with_format(format)
            .with_progress(!cli.quiet && config.repl.show_progress)
            .with_history_path(history_path);

        repl.run().await?;
        return Ok(());
    }

    // Single question mode - question is required
    let question = match cli.question {
        Some(q) => q,
        None => bail!("Question is required. Use --chat for interactive mode."),
    };

    let request = QueryRequest::new(question.clone(), targets.clone(), aggregator)
        .with_instructions(config.aggregation.instructions())
        .with_reference_options(config.reference_options());

    // Print header
    if !cli.quiet && format != OutputFormat::Json {
        println!();
        println!("+============================================================+");
        println!("|           Agent Fusion - Mixture of Agents                 |");
        println!("+============================================================+");
        println!();
        println!("Question: {}", question);
        println!(
            "Models: {}",
            targets
                .iter()
                .map(|m| m.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!();
    }

    let cancellation = CancellationToken::new();
    spawn_ctrl_c_handler(cancellation.clone());

    let use_case = RunFusionUseCase::with_params(gateway, config.execution_params())
        .with_cancellation(cancellation);

    // Stream the answer live unless a full or machine-readable rendering was asked for
    let streamed = !cli.quiet && format == OutputFormat::Synthesis;

    let result = if cli.quiet {
        use_case.execute(&request).await
    } else {
        let progress: Box<dyn ProgressNotifier> = if std::io::stderr().is_terminal() {
            Box::new(ProgressReporter::new().with_streaming(streamed))
        } else {
            Box::new(SimpleProgress::new().with_streaming(streamed))
        };
        use_case.execute_with_progress(&request, progress.as_ref()).await
    };

    match result {
        Ok(result) if streamed => {
            println!();
            println!("{}", ConsoleFormatter::format_summary(&result));
            Ok(())
        }
        Ok(result) => {
            println!("{}", ConsoleFormatter::render(&result, format));
            Ok(())
        }
        Err(e) => {
            if !streamed && let Some(partial) = e.partial_text().filter(|p| !p.is_empty()) {
                println!("{}", partial);
            }
            if e.is_cancelled() {
                bail!("Cancelled");
            }
            Err(e.into())
        }
    }
}

/// Install the tracing subscriber.
///
/// Verbosity comes from `-v` unless `RUST_LOG` is set. Logs go to stderr,
/// plus a daily-rotated file when `log_dir` is given.
fn init_logging(verbose: u8, log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace", // -vvv or more
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "agent-fusion.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

/// CLI flags take precedence over every config source.
fn apply_cli_overrides(config: &mut FileConfig, cli: &Cli) {
    if !cli.model.is_empty() {
        config.models.references = Some(cli.model.clone());
    }
    if let Some(aggregator) = &cli.aggregator {
        config.models.aggregator = Some(aggregator.clone());
    }
    if let Some(instructions) = &cli.instructions {
        config.aggregation.instructions = Some(instructions.clone());
    }
    if let Some(temperature) = cli.temperature {
        config.generation.temperature = temperature;
    }
    if let Some(max_tokens) = cli.max_tokens {
        config.generation.max_tokens = max_tokens;
    }
    if let Some(format) = cli.output {
        config.output.format = Some(format.into());
    }
}

/// Log warnings; refuse to start on errors.
fn check_config(issues: &[ConfigIssue]) -> Result<()> {
    let mut errors = Vec::new();
    for issue in issues {
        if issue.is_error() {
            errors.push(issue.message.clone());
        } else {
            warn!("{}", issue.message);
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    for message in &errors {
        eprintln!("{} {}", "config error:".red().bold(), message);
    }
    bail!("Invalid configuration ({} error(s))", errors.len());
}

/// Cancel the run on the first Ctrl-C.
fn spawn_ctrl_c_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted; cancelling run");
            token.cancel();
        }
    });
}
