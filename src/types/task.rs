//! Work item and continuation token definitions
//!
//! These types mirror the JSON events exchanged with the orchestrator.
//! A work item is an opaque caller-defined payload; the worker only ever
//! adds status fields to it, never interprets the rest.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────
// Status Markers
// ─────────────────────────────────────────────────────────────────

/// Status value stamped on successfully processed items
pub const STATUS_SUCCESS: &str = "SUCCESS";

/// Status value stamped on failed items
pub const STATUS_FAILED: &str = "FAILED";

/// Field stamped by the batch execution step
pub const BATCH_STATUS_FIELD: &str = "BATCH_STATUS";

/// Field stamped by the initialize step
pub const INITIALIZE_STATUS_FIELD: &str = "INITIALIZE_STATUS";

// ─────────────────────────────────────────────────────────────────
// Work Item
// ─────────────────────────────────────────────────────────────────

/// A unit of work dispatched by the orchestrator.
///
/// Carries an identifier plus arbitrary caller-defined fields. The payload
/// is passed through unchanged except for the status fields the worker
/// stamps on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    /// Item identifier (generated if the event omits one)
    #[serde(default = "WorkItem::generate_id")]
    pub id: String,

    /// Caller-defined payload fields, passed through untouched
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl WorkItem {
    /// Create a new work item with the given id and no extra fields
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            fields: Map::new(),
        }
    }

    /// Generate an item id (used when the event carries none)
    pub fn generate_id() -> String {
        format!("item-{}", &Uuid::new_v4().to_string()[..8])
    }

    /// Get a payload field
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Set a payload field, replacing any existing value
    pub fn set_field(&mut self, key: impl Into<String>, value: Value) {
        self.fields.insert(key.into(), value);
    }

    /// Stamp a status field (e.g. `BATCH_STATUS = "SUCCESS"`)
    pub fn stamp_status(&mut self, field: &str, status: &str) {
        self.fields
            .insert(field.to_string(), Value::String(status.to_string()));
    }

    /// Get a stamped status field, if present
    pub fn status(&self, field: &str) -> Option<&str> {
        self.fields.get(field).and_then(|v| v.as_str())
    }

    /// Serialize the item to a JSON value
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

// ─────────────────────────────────────────────────────────────────
// Continuation Token
// ─────────────────────────────────────────────────────────────────

/// Opaque token correlating a callback with an in-flight workflow step.
///
/// Issued by the orchestrator per step. Treated as an unstructured
/// credential: never parsed, only forwarded. `Debug` and `Display` render
/// a truncated form so full tokens never reach logs.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContinuationToken(String);

impl ContinuationToken {
    /// Wrap a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token, for forwarding to the orchestrator
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the wrapper and return the raw token
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Redacted rendering for logs (prefix + length)
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(4).collect();
        format!("{}…({})", prefix, self.0.len())
    }
}

impl fmt::Debug for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContinuationToken({})", self.redacted())
    }
}

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.redacted())
    }
}

impl From<&str> for ContinuationToken {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ContinuationToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

// ─────────────────────────────────────────────────────────────────
// Work Order
// ─────────────────────────────────────────────────────────────────

/// The invocation event: a work item plus its continuation token.
///
/// The orchestrator dispatches this as one JSON object with the token in
/// the `task_token` field and the item fields alongside it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkOrder {
    /// Continuation token for the step (may also arrive out-of-band)
    #[serde(rename = "task_token", skip_serializing_if = "Option::is_none")]
    pub token: Option<ContinuationToken>,

    /// The work item payload
    #[serde(flatten)]
    pub item: WorkItem,
}

impl WorkOrder {
    /// Create a work order from an item and token
    pub fn new(item: WorkItem, token: impl Into<ContinuationToken>) -> Self {
        Self {
            token: Some(token.into()),
            item,
        }
    }

    /// Parse a work order from a JSON event string
    pub fn from_json(event: &str) -> crate::error::Result<Self> {
        serde_json::from_str(event).map_err(|e| crate::error::Error::EventMalformed {
            message: e.to_string(),
            source: Some(e),
        })
    }
}

// ─────────────────────────────────────────────────────────────────
// Execution Result
// ─────────────────────────────────────────────────────────────────

/// Outcome of one executor invocation, as reported to the orchestrator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionResult {
    /// Work completed; `output` is the item with status stamped
    Success { output: Value },

    /// Work failed; `error` and `cause` describe the failure
    Failure { error: String, cause: String },
}

impl ExecutionResult {
    /// Whether this is a success result
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success { .. })
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
