//! Configuration system for the Batchflow worker
//!
//! Supports multiple configuration sources with the following precedence
//! (highest to lowest):
//! 1. CLI arguments
//! 2. Environment variables (BATCHFLOW_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Main worker configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerConfig {
    /// Worker identity and basic settings
    pub worker: WorkerSettings,

    /// Orchestrator callback settings
    pub orchestrator: OrchestratorSettings,

    /// Executor settings
    pub executor: ExecutorSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Worker identity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkerSettings {
    /// Unique worker identifier (auto-generated if not set)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Human-readable worker name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Worker tags for fleet filtering
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Orchestrator callback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorSettings {
    /// Base URL of the orchestrator callback API
    pub callback_url: String,

    /// Callback request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Bearer token for the callback API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

/// Executor settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorSettings {
    /// Work deadline in seconds (0 = no deadline)
    pub work_timeout_secs: u64,

    /// Number of chunks the batch work processes an item in
    pub batch_chunks: u32,

    /// Suspension between chunks in milliseconds
    pub chunk_delay_ms: u64,

    /// Maximum runtime threads (0 = auto)
    pub max_threads: u32,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Maximum log file size in MB before rotation
    pub max_file_size_mb: u64,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

// Default implementations

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            worker: WorkerSettings::default(),
            orchestrator: OrchestratorSettings::default(),
            executor: ExecutorSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for WorkerSettings {
    fn default() -> Self {
        Self {
            id: None,
            name: None,
            tags: vec![],
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            callback_url: "http://localhost:8080".to_string(),
            request_timeout_ms: 30000,
            auth_token: None,
        }
    }
}

impl Default for ExecutorSettings {
    fn default() -> Self {
        Self {
            work_timeout_secs: 0, // No deadline
            batch_chunks: 4,
            chunk_delay_ms: 50,
            max_threads: 0, // Auto-detect
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            max_file_size_mb: 100,
            max_files: 5,
            json_format: false,
        }
    }
}

impl WorkerConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        let config_file = Self::find_config_file(config_path)?;
        if let Some(path) = config_file {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| {
                let message = e.message().to_string();
                Error::ConfigParse {
                    message,
                    source: Some(e),
                }
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // If explicit path provided, use it (error if not found)
        if let Some(path) = explicit_path {
            let expanded = shellexpand::tilde(path);
            let path = PathBuf::from(expanded.as_ref());
            if path.exists() {
                return Ok(Some(path));
            } else {
                return Err(Error::config_not_found(path));
            }
        }

        // Search in standard locations
        let search_paths = [
            // Current directory
            PathBuf::from("batchflow-worker.toml"),
            PathBuf::from("config.toml"),
            // User config directory
            dirs::config_dir()
                .map(|p| p.join("batchflow").join("worker.toml"))
                .unwrap_or_default(),
            // Home directory
            dirs::home_dir()
                .map(|p| p.join(".batchflow").join("worker.toml"))
                .unwrap_or_default(),
            // System config (Linux)
            PathBuf::from("/etc/batchflow/worker.toml"),
        ];

        for path in &search_paths {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        // Worker settings
        if let Ok(val) = std::env::var("BATCHFLOW_WORKER_ID") {
            self.worker.id = Some(val);
        }
        if let Ok(val) = std::env::var("BATCHFLOW_WORKER_NAME") {
            self.worker.name = Some(val);
        }

        // Orchestrator settings
        if let Ok(val) = std::env::var("BATCHFLOW_CALLBACK_URL") {
            self.orchestrator.callback_url = val;
        }
        if let Ok(val) = std::env::var("BATCHFLOW_REQUEST_TIMEOUT_MS") {
            if let Ok(n) = val.parse() {
                self.orchestrator.request_timeout_ms = n;
            }
        }
        if let Ok(val) = std::env::var("BATCHFLOW_AUTH_TOKEN") {
            self.orchestrator.auth_token = Some(val);
        }

        // Executor settings
        if let Ok(val) = std::env::var("BATCHFLOW_WORK_TIMEOUT_SECS") {
            if let Ok(n) = val.parse() {
                self.executor.work_timeout_secs = n;
            }
        }
        if let Ok(val) = std::env::var("BATCHFLOW_BATCH_CHUNKS") {
            if let Ok(n) = val.parse() {
                self.executor.batch_chunks = n;
            }
        }
        if let Ok(val) = std::env::var("BATCHFLOW_CHUNK_DELAY_MS") {
            if let Ok(n) = val.parse() {
                self.executor.chunk_delay_ms = n;
            }
        }
        if let Ok(val) = std::env::var("BATCHFLOW_MAX_THREADS") {
            if let Ok(n) = val.parse() {
                self.executor.max_threads = n;
            }
        }

        // Logging settings
        if let Ok(val) = std::env::var("BATCHFLOW_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("BATCHFLOW_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("BATCHFLOW_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and other path variables
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        // Validate callback URL
        if self.orchestrator.callback_url.is_empty() {
            return Err(Error::config_field_invalid(
                "orchestrator.callback_url",
                "Callback URL cannot be empty",
            ));
        }
        if !self.orchestrator.callback_url.starts_with("http://")
            && !self.orchestrator.callback_url.starts_with("https://")
        {
            return Err(Error::config_field_invalid(
                "orchestrator.callback_url",
                "Callback URL must start with http:// or https://",
            ));
        }

        // Validate timeouts
        if self.orchestrator.request_timeout_ms == 0 {
            return Err(Error::config_field_invalid(
                "orchestrator.request_timeout_ms",
                "request_timeout_ms must be greater than 0",
            ));
        }

        // Validate batch shape
        if self.executor.batch_chunks == 0 {
            return Err(Error::config_field_invalid(
                "executor.batch_chunks",
                "batch_chunks must be at least 1",
            ));
        }

        // Validate log level
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    valid_levels.join(", ")
                ),
            ));
        }

        Ok(())
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Initialize a new configuration file
pub fn init_config(path: Option<&str>, force: bool) -> Result<()> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".batchflow")
                .join("worker.toml")
        });

    // Check if file exists
    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    // Create parent directories
    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    // Generate default config with comments
    let config_content = generate_default_config();

    // Write the file
    fs::write(&config_path, config_content).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    println!("Configuration file created: {}", config_path.display());
    Ok(())
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Batchflow Worker Configuration
# https://github.com/batchflow/worker

[worker]
# Unique worker identifier (auto-generated if not set)
# id = "worker-abc123"

# Human-readable worker name
# name = "My Worker"

# Tags for fleet filtering
tags = []

[orchestrator]
# Base URL of the orchestrator callback API
callback_url = "http://localhost:8080"

# Callback request timeout in milliseconds
request_timeout_ms = 30000

# Bearer token for the callback API
# auth_token = "secret"

[executor]
# Work deadline in seconds (0 = no deadline)
work_timeout_secs = 0

# Number of chunks the batch work processes an item in
batch_chunks = 4

# Suspension between chunks in milliseconds
chunk_delay_ms = 50

# Maximum runtime threads (0 = auto)
max_threads = 0

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log file path (no file logging if unset)
# file = "~/.batchflow/logs/worker.log"

# Maximum log file size in MB before rotation
max_file_size_mb = 100

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
