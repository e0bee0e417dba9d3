//! Configuration system tests
//!
//! Tests configuration loading, validation, and environment overrides
//! through the binary's config commands.

use std::fs;
use std::path::PathBuf;

use predicates::prelude::*;
use tempfile::TempDir;

/// Test fixture for configuration testing
struct ConfigFixture {
    _temp_dir: TempDir,
    config_path: PathBuf,
}

impl ConfigFixture {
    fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.toml");
        Self {
            _temp_dir: temp_dir,
            config_path,
        }
    }

    fn write_config(&self, content: &str) {
        fs::write(&self.config_path, content).unwrap();
    }

    fn path(&self) -> &str {
        self.config_path.to_str().unwrap()
    }
}

fn worker_cmd() -> assert_cmd::Command {
    let mut cmd = assert_cmd::Command::cargo_bin("batchflow-worker").unwrap();
    cmd.env_remove("BATCHFLOW_CALLBACK_URL");
    cmd.env_remove("BATCHFLOW_BATCH_CHUNKS");
    cmd.env_remove("BATCHFLOW_LOG_LEVEL");
    cmd
}

// ─────────────────────────────────────────────────────────────────
// Valid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_minimal_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "https://example.com"
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success();
}

#[test]
fn test_full_config() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[worker]
id = "test-worker-001"
name = "Test Worker"
tags = ["batch", "fast", "test"]

[orchestrator]
callback_url = "https://orchestrator.example.com"
request_timeout_ms = 60000
auth_token = "secret"

[executor]
work_timeout_secs = 300
batch_chunks = 16
chunk_delay_ms = 25
max_threads = 8

[logging]
level = "debug"
max_file_size_mb = 10
max_files = 3
json_format = true
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success();
}

#[test]
fn test_config_show_reflects_file_values() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "https://callbacks.internal:9443"

[executor]
batch_chunks = 12
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("https://callbacks.internal:9443"))
        .stdout(predicate::str::contains("batch_chunks = 12"));
}

// ─────────────────────────────────────────────────────────────────
// Invalid Configuration Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_invalid_callback_scheme() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "ws://not-supported"
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(10)
        .stderr(predicate::str::contains("http://").or(predicate::str::contains("https://")));
}

#[test]
fn test_zero_batch_chunks_rejected() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "http://localhost:8080"

[executor]
batch_chunks = 0
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("batch_chunks"));
}

#[test]
fn test_invalid_log_level_rejected() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "http://localhost:8080"

[logging]
level = "loud"
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("log level"));
}

#[test]
fn test_malformed_toml_rejected() {
    let fixture = ConfigFixture::new();
    fixture.write_config("this is not toml = = =");

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .assert()
        .failure()
        .code(10);
}

// ─────────────────────────────────────────────────────────────────
// Environment Override Tests
// ─────────────────────────────────────────────────────────────────

#[test]
fn test_env_overrides_file_values() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "http://from-file:8080"

[executor]
batch_chunks = 4
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("show")
        .arg("--config")
        .arg(fixture.path())
        .env("BATCHFLOW_CALLBACK_URL", "http://from-env:9090")
        .env("BATCHFLOW_BATCH_CHUNKS", "9")
        .assert()
        .success()
        .stdout(predicate::str::contains("http://from-env:9090"))
        .stdout(predicate::str::contains("batch_chunks = 9"));
}

#[test]
fn test_env_override_is_validated() {
    let fixture = ConfigFixture::new();
    fixture.write_config(
        r#"
[orchestrator]
callback_url = "http://localhost:8080"
"#,
    );

    worker_cmd()
        .arg("config")
        .arg("validate")
        .arg("--config")
        .arg(fixture.path())
        .env("BATCHFLOW_CALLBACK_URL", "gopher://nope")
        .assert()
        .failure()
        .code(10);
}
