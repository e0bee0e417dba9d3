//! CLI argument parsing using clap v4
//!
//! Defines the command-line interface for the Batchflow worker.

use clap::{Parser, Subcommand};

/// Batchflow Worker - Durable batch task executor
///
/// Receives a work order from the workflow orchestrator, executes the batch
/// task, and reports completion or failure back through the orchestrator's
/// callback API using the step's continuation token.
#[derive(Parser, Debug)]
#[command(name = "batchflow-worker")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for the worker
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a work order and report the result to the orchestrator
    Run {
        /// Path to configuration file
        #[arg(short, long, env = "BATCHFLOW_CONFIG")]
        config: Option<String>,

        /// Path to the work order event JSON ("-" or omitted = stdin)
        #[arg(short, long)]
        event: Option<String>,

        /// Continuation token override (falls back to the event's task_token field)
        #[arg(long, env = "BATCHFLOW_TASK_TOKEN")]
        token: Option<String>,
    },

    /// Run a pass-through workflow step on an event
    Step {
        /// Step name: initialize, notify-success, notify-failure
        name: String,

        /// Path to the event JSON ("-" or omitted = stdin)
        #[arg(short, long)]
        event: Option<String>,
    },

    /// Display version and build information
    Version,

    /// Configuration management
    Config {
        #[command(subcommand)]
        subcommand: ConfigSubcommand,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Display the current configuration
    Show {
        /// Path to configuration file
        #[arg(short, long)]
        config: Option<String>,
    },

    /// Initialize a new configuration file
    Init {
        /// Path where to create the config file
        #[arg(short, long)]
        path: Option<String>,

        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a configuration file
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        config: Option<String>,
    },
}
