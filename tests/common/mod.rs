//! Common test utilities and fixtures
//!
//! This module provides shared test infrastructure

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// Get the path to the test fixtures directory
pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Get a path to a specific fixture file
pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Get the valid config fixture path
pub fn valid_config_fixture() -> PathBuf {
    fixture_path("valid_config.toml")
}

/// Get the invalid config fixture path
pub fn invalid_config_fixture() -> PathBuf {
    fixture_path("invalid_config.toml")
}

// ─────────────────────────────────────────────────────────────────
// Test Environment
// ─────────────────────────────────────────────────────────────────

/// Temp directory with a config file and event files for binary tests
pub struct TestEnvironment {
    pub root: TempDir,
    pub config_path: PathBuf,
}

impl TestEnvironment {
    /// Create a new test environment with a fast default configuration
    pub fn new() -> Self {
        Self::with_callback_url("http://127.0.0.1:1")
    }

    /// Create a test environment pointing at a specific orchestrator
    pub fn with_callback_url(callback_url: &str) -> Self {
        let root = TempDir::new().expect("Failed to create temp directory");
        let config_path = root.path().join("config.toml");

        let config = format!(
            r#"
[worker]
id = "test-worker"
name = "Integration Test Worker"

[orchestrator]
callback_url = "{}"
request_timeout_ms = 2000

[executor]
work_timeout_secs = 10
batch_chunks = 2
chunk_delay_ms = 0

[logging]
level = "debug"
"#,
            callback_url
        );

        fs::write(&config_path, config).expect("Failed to write config");

        Self { root, config_path }
    }

    /// Get the config path as a string
    pub fn config(&self) -> &str {
        self.config_path.to_str().unwrap()
    }

    /// Write an event file and return its path
    pub fn write_event(&self, name: &str, content: &str) -> PathBuf {
        let path = self.root.path().join(name);
        fs::write(&path, content).expect("Failed to write event");
        path
    }

    /// Get a worker command configured with this environment
    pub fn worker_cmd(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::Command::cargo_bin("batchflow-worker").unwrap();
        cmd.current_dir(self.root.path());
        cmd.env_remove("BATCHFLOW_TASK_TOKEN");
        cmd.env_remove("BATCHFLOW_CONFIG");
        cmd
    }
}

impl Default for TestEnvironment {
    fn default() -> Self {
        Self::new()
    }
}
