//! Batchflow Worker - Durable batch task executor
//!
//! This is the main entry point for the worker binary. The worker receives
//! a work order from the workflow orchestrator, executes the batch task,
//! and reports completion or failure back through the orchestrator's
//! callback API using the step's continuation token.

mod callback;
mod cli;
mod config;
mod error;
mod executor;
mod logging;
mod protocol;
mod steps;
mod types;
mod version;
mod work;

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::info;

use crate::callback::{HttpCallback, HttpCallbackConfig};
use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::config::WorkerConfig;
use crate::error::{Error, Result};
use crate::executor::{ExecutorConfig, TaskExecutor};
use crate::steps::Step;
use crate::types::{WorkItem, WorkOrder};
use crate::work::{BatchWork, BatchWorkConfig};

fn main() {
    if let Err(e) = run() {
        eprint!("{}", e.format_for_terminal());
        std::process::exit(e.exit_code());
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments first (before logging, so we know verbosity)
    let cli = Cli::parse();

    // For commands that don't need full logging, use simple setup
    match &cli.command {
        Commands::Version => {
            version::print_version();
            return Ok(());
        }
        Commands::Config { subcommand } => {
            logging::init_simple(tracing::Level::WARN)?;
            return handle_config_command(subcommand.clone());
        }
        Commands::Step { name, event } => {
            logging::init_simple(if cli.verbose > 0 {
                tracing::Level::DEBUG
            } else {
                tracing::Level::INFO
            })?;
            return handle_step_command(name, event.as_deref());
        }
        Commands::Run { .. } => {}
    }

    // Load configuration for the run command
    let (config_path, event_path, token_override) = match &cli.command {
        Commands::Run { config, event, token } => {
            (config.clone(), event.clone(), token.clone())
        }
        _ => unreachable!(),
    };

    let config = WorkerConfig::load(config_path.as_deref())?;

    // Initialize logging with config settings.
    // The guards must be kept alive for the lifetime of the program.
    let _log_guards = logging::init_logging(&config.logging, cli.verbose, cli.quiet)?;

    // Log version info at startup
    let build = version::build_info();
    info!(
        version = %build.full_version(),
        target = %build.target,
        profile = %build.profile,
        "Starting Batchflow Worker"
    );

    run_worker(config, event_path, token_override)
}

/// Run the worker for one work order
fn run_worker(
    config: WorkerConfig,
    event_path: Option<String>,
    token_override: Option<String>,
) -> Result<()> {
    let worker_id = config
        .worker
        .id
        .clone()
        .unwrap_or_else(|| format!("worker-{}", &uuid::Uuid::new_v4().to_string()[..8]));
    let worker_name = config
        .worker
        .name
        .clone()
        .unwrap_or_else(default_worker_name);

    info!(
        worker_id = %worker_id,
        worker_name = %worker_name,
        callback_url = %config.orchestrator.callback_url,
        "Configuration loaded"
    );

    // Build and run the tokio runtime
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(if config.executor.max_threads > 0 {
            config.executor.max_threads as usize
        } else {
            num_cpus::get().min(8)
        })
        .thread_name("batchflow-worker")
        .build()
        .map_err(|e| Error::Internal(format!("Failed to create async runtime: {}", e)))?;

    runtime.block_on(async_worker_main(config, event_path, token_override))
}

/// Async worker main: execute one work order end to end
async fn async_worker_main(
    config: WorkerConfig,
    event_path: Option<String>,
    token_override: Option<String>,
) -> Result<()> {
    // Parse the work order event
    let event = read_event(event_path.as_deref())?;
    let mut order = WorkOrder::from_json(&event)?;

    // Token precedence: CLI flag / environment over the event field
    if let Some(token) = token_override {
        order.token = Some(token.into());
    }

    // Wire the production capabilities from config
    let callback = HttpCallback::new(HttpCallbackConfig {
        base_url: config.orchestrator.callback_url.clone(),
        request_timeout: Duration::from_millis(config.orchestrator.request_timeout_ms),
        auth_token: config.orchestrator.auth_token.clone(),
    })?;

    let work = BatchWork::with_config(BatchWorkConfig {
        chunks: config.executor.batch_chunks,
        chunk_delay: Duration::from_millis(config.executor.chunk_delay_ms),
    });

    let executor = TaskExecutor::new(
        ExecutorConfig {
            work_timeout_secs: config.executor.work_timeout_secs,
        },
        Arc::new(work),
        Arc::new(callback),
    );

    let result = executor.execute(order).await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&result)
            .map_err(|e| Error::Internal(format!("Failed to render result: {}", e)))?
    );

    Ok(())
}

/// Run a pass-through step on an event and print the resulting item
fn handle_step_command(name: &str, event_path: Option<&str>) -> Result<()> {
    let step: Step = name.parse()?;
    let event = read_event(event_path)?;
    let item: WorkItem = serde_json::from_str(&event).map_err(|e| Error::EventMalformed {
        message: e.to_string(),
        source: Some(e),
    })?;

    let item = steps::run_step(step, item);

    println!(
        "{}",
        serde_json::to_string_pretty(&item)
            .map_err(|e| Error::Internal(format!("Failed to render item: {}", e)))?
    );

    Ok(())
}

/// Handle configuration subcommands
fn handle_config_command(subcommand: ConfigSubcommand) -> Result<()> {
    match subcommand {
        ConfigSubcommand::Show { config } => {
            let cfg = WorkerConfig::load(config.as_deref())?;
            println!("{}", toml::to_string_pretty(&cfg)?);
        }
        ConfigSubcommand::Init { path, force } => {
            config::init_config(path.as_deref(), force)?;
        }
        ConfigSubcommand::Validate { config } => {
            WorkerConfig::load(config.as_deref())?;
            println!("Configuration is valid.");
        }
    }

    Ok(())
}

/// Read the event JSON from a file or stdin ("-" or omitted)
fn read_event(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).map_err(|e| Error::IoRead {
                path: PathBuf::from(path),
                source: e,
            })
        }
        _ => {
            let mut event = String::new();
            std::io::stdin()
                .read_to_string(&mut event)
                .map_err(Error::Io)?;
            Ok(event)
        }
    }
}

/// Default worker name based on hostname
fn default_worker_name() -> String {
    hostname::get()
        .ok()
        .and_then(|h| h.into_string().ok())
        .map(|h| format!("Batchflow Worker ({})", h))
        .unwrap_or_else(|| "Batchflow Worker".to_string())
}
