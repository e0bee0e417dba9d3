//! Callback report definitions
//!
//! The worker reports exactly one of these per continuation token. The
//! token travels only in the report body; it is forwarded verbatim and
//! never inspected.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::ContinuationToken;

// ─────────────────────────────────────────────────────────────────
// Report Envelope
// ─────────────────────────────────────────────────────────────────

/// Wrapper for callback reports with delivery metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEnvelope {
    /// Unique report ID
    pub id: Uuid,

    /// Report timestamp
    pub timestamp: DateTime<Utc>,

    /// The actual report payload
    #[serde(flatten)]
    pub report: Report,
}

impl ReportEnvelope {
    /// Create a new report envelope
    pub fn new(report: Report) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            report,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Report Types (Discriminated Union)
// ─────────────────────────────────────────────────────────────────

/// Callback reports (worker → orchestrator)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Report {
    /// Step completed; resume the workflow
    TaskSuccess(SuccessReport),

    /// Step failed; run the workflow's failure path
    TaskFailure(FailureReport),
}

impl Report {
    /// Get the report type name
    pub fn type_name(&self) -> &'static str {
        match self {
            Report::TaskSuccess(_) => "TASK_SUCCESS",
            Report::TaskFailure(_) => "TASK_FAILURE",
        }
    }

    /// The token this report correlates to
    pub fn token(&self) -> &ContinuationToken {
        match self {
            Report::TaskSuccess(r) => &r.task_token,
            Report::TaskFailure(r) => &r.task_token,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Success / Failure Reports
// ─────────────────────────────────────────────────────────────────

/// Successful completion of a workflow step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessReport {
    /// Continuation token issued by the orchestrator for this step
    pub task_token: ContinuationToken,

    /// Serialized output derived from the work item
    pub output: String,
}

/// Failed completion of a workflow step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    /// Continuation token issued by the orchestrator for this step
    pub task_token: ContinuationToken,

    /// Error summary
    pub error: String,

    /// Human-readable cause
    pub cause: String,
}

// ─────────────────────────────────────────────────────────────────
// Acknowledgement
// ─────────────────────────────────────────────────────────────────

/// Orchestrator response to a delivered report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAck {
    /// Whether the report was accepted
    pub accepted: bool,

    /// Any rejection message
    #[serde(default)]
    pub message: Option<String>,
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ContinuationToken;
    use serde_json::json;

    #[test]
    fn test_success_report_shape() {
        let envelope = ReportEnvelope::new(Report::TaskSuccess(SuccessReport {
            task_token: ContinuationToken::new("T1"),
            output: r#"{"id":"A","BATCH_STATUS":"SUCCESS"}"#.to_string(),
        }));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], json!("TASK_SUCCESS"));
        assert_eq!(value["task_token"], json!("T1"));
        assert!(value["output"].as_str().unwrap().contains("BATCH_STATUS"));
        assert!(value["id"].is_string());
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_failure_report_shape() {
        let envelope = ReportEnvelope::new(Report::TaskFailure(FailureReport {
            task_token: ContinuationToken::new("T2"),
            error: "disk full".to_string(),
            cause: "disk full".to_string(),
        }));

        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["type"], json!("TASK_FAILURE"));
        assert_eq!(value["task_token"], json!("T2"));
        assert_eq!(value["error"], json!("disk full"));
        assert_eq!(value["cause"], json!("disk full"));
    }

    #[test]
    fn test_report_token_accessor() {
        let report = Report::TaskFailure(FailureReport {
            task_token: ContinuationToken::new("T2"),
            error: "e".to_string(),
            cause: "c".to_string(),
        });

        assert_eq!(report.token().as_str(), "T2");
        assert_eq!(report.type_name(), "TASK_FAILURE");
    }

    #[test]
    fn test_ack_default_message() {
        let ack: ReportAck = serde_json::from_str(r#"{"accepted":true}"#).unwrap();
        assert!(ack.accepted);
        assert!(ack.message.is_none());
    }
}
