//! Mock work function for testing
//!
//! Provides a deterministic WorkFunction implementation with injectable
//! failure, panic, and latency behavior.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::types::WorkItem;

use super::WorkFunction;

// ─────────────────────────────────────────────────────────────────
// Mock Work Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for mock work behavior
#[derive(Debug, Clone, Default)]
pub struct MockWorkConfig {
    /// Simulated work latency
    pub latency: Duration,

    /// Fail with this message instead of completing
    pub fail_with: Option<String>,

    /// Panic with this message instead of completing
    pub panic_with: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Mock Work
// ─────────────────────────────────────────────────────────────────

/// Mock implementation of WorkFunction for testing
pub struct MockWork {
    config: MockWorkConfig,
    run_count: Mutex<u32>,
}

impl MockWork {
    /// Create a mock that completes immediately
    pub fn new() -> Self {
        Self::with_config(MockWorkConfig::default())
    }

    /// Create a mock with custom behavior
    pub fn with_config(config: MockWorkConfig) -> Self {
        Self {
            config,
            run_count: Mutex::new(0),
        }
    }

    /// Create a mock that fails with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self::with_config(MockWorkConfig {
            fail_with: Some(message.into()),
            ..Default::default()
        })
    }

    /// Create a mock that panics with the given message
    pub fn panicking(message: impl Into<String>) -> Self {
        Self::with_config(MockWorkConfig {
            panic_with: Some(message.into()),
            ..Default::default()
        })
    }

    /// Number of times `run` was invoked
    pub fn run_count(&self) -> u32 {
        *self.run_count.lock()
    }
}

impl Default for MockWork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkFunction for MockWork {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn run(&self, item: WorkItem) -> Result<WorkItem> {
        *self.run_count.lock() += 1;

        if !self.config.latency.is_zero() {
            tokio::time::sleep(self.config.latency).await;
        }

        if let Some(ref message) = self.config.panic_with {
            panic!("{}", message);
        }

        if let Some(ref message) = self.config.fail_with {
            return Err(Error::work_failed_for(item.id.clone(), message.clone()));
        }

        Ok(item)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
