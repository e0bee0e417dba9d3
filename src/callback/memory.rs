//! In-memory callback channel for testing
//!
//! Records every report instead of delivering it, with injectable
//! delivery failure to exercise the executor's error propagation.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::types::ContinuationToken;

use super::CallbackChannel;

// ─────────────────────────────────────────────────────────────────
// Recorded Reports
// ─────────────────────────────────────────────────────────────────

/// A report captured by the in-memory channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordedReport {
    /// A success report with its serialized output
    Success { token: String, output: String },

    /// A failure report with error and cause
    Failure {
        token: String,
        error: String,
        cause: String,
    },
}

impl RecordedReport {
    /// The token the report was made for
    pub fn token(&self) -> &str {
        match self {
            RecordedReport::Success { token, .. } => token,
            RecordedReport::Failure { token, .. } => token,
        }
    }

    /// Whether this is a success report
    pub fn is_success(&self) -> bool {
        matches!(self, RecordedReport::Success { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// In-Memory Callback
// ─────────────────────────────────────────────────────────────────

/// Test callback channel recording reports in memory
pub struct InMemoryCallback {
    fail_delivery: bool,
    reports: Mutex<Vec<RecordedReport>>,
}

impl InMemoryCallback {
    /// Create a channel that accepts every report
    pub fn new() -> Self {
        Self {
            fail_delivery: false,
            reports: Mutex::new(Vec::new()),
        }
    }

    /// Create a channel that fails every delivery
    pub fn failing() -> Self {
        Self {
            fail_delivery: true,
            reports: Mutex::new(Vec::new()),
        }
    }

    /// All recorded reports, in delivery order
    pub fn reports(&self) -> Vec<RecordedReport> {
        self.reports.lock().clone()
    }

    /// Reports recorded for a specific token
    pub fn reports_for(&self, token: &str) -> Vec<RecordedReport> {
        self.reports
            .lock()
            .iter()
            .filter(|r| r.token() == token)
            .cloned()
            .collect()
    }

    /// Number of success reports recorded
    pub fn success_count(&self) -> usize {
        self.reports.lock().iter().filter(|r| r.is_success()).count()
    }

    /// Number of failure reports recorded
    pub fn failure_count(&self) -> usize {
        self.reports.lock().iter().filter(|r| !r.is_success()).count()
    }
}

impl Default for InMemoryCallback {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CallbackChannel for InMemoryCallback {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn report_success(&self, token: &ContinuationToken, output: &str) -> Result<()> {
        if self.fail_delivery {
            return Err(Error::callback_rejected(503, "injected delivery failure"));
        }
        self.reports.lock().push(RecordedReport::Success {
            token: token.as_str().to_string(),
            output: output.to_string(),
        });
        Ok(())
    }

    async fn report_failure(
        &self,
        token: &ContinuationToken,
        error: &str,
        cause: &str,
    ) -> Result<()> {
        if self.fail_delivery {
            return Err(Error::callback_rejected(503, "injected delivery failure"));
        }
        self.reports.lock().push(RecordedReport::Failure {
            token: token.as_str().to_string(),
            error: error.to_string(),
            cause: cause.to_string(),
        });
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
