//! Execution state tracking
//!
//! Tracks per-token execution state and enforces the at-most-once report
//! invariant: a token that has reached a terminal state never accepts
//! another report.

use std::collections::HashMap;
use std::time::Instant;

use parking_lot::RwLock;

use crate::error::{Error, Result};

// ─────────────────────────────────────────────────────────────────
// Execution State
// ─────────────────────────────────────────────────────────────────

/// Outcome of a reported execution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Success was reported for the token
    Success,
    /// Failure was reported for the token
    Failure,
}

impl std::fmt::Display for ReportOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportOutcome::Success => write!(f, "success"),
            ReportOutcome::Failure => write!(f, "failure"),
        }
    }
}

/// State of a work order being executed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    /// Order accepted, work not yet started
    Pending,
    /// Work is currently running
    Running,
    /// A result was reported; terminal
    Reported(ReportOutcome),
}

impl ExecutionState {
    /// Whether this state is terminal
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Reported(_))
    }
}

// ─────────────────────────────────────────────────────────────────
// Ledger Entry
// ─────────────────────────────────────────────────────────────────

/// Per-token tracking record
#[derive(Debug)]
struct LedgerEntry {
    /// Current execution state
    state: ExecutionState,

    /// Item being executed under this token
    item_id: String,

    /// When the order was accepted
    accepted_at: Instant,

    /// When work started
    started_at: Option<Instant>,

    /// When the result was reported
    reported_at: Option<Instant>,
}

impl LedgerEntry {
    fn new(item_id: String) -> Self {
        Self {
            state: ExecutionState::Pending,
            item_id,
            accepted_at: Instant::now(),
            started_at: None,
            reported_at: None,
        }
    }

    fn execution_time_ms(&self) -> u64 {
        match (self.started_at, self.reported_at) {
            (Some(start), Some(end)) => (end - start).as_millis() as u64,
            (Some(start), None) => start.elapsed().as_millis() as u64,
            _ => 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Token Ledger
// ─────────────────────────────────────────────────────────────────

/// Tracks execution state per continuation token.
///
/// Invariant: each token transitions `Pending → Running →
/// Reported(outcome)` exactly once. Re-registration of a terminal token
/// and double reports are rejected.
pub struct TokenLedger {
    /// Entries by raw token
    entries: RwLock<HashMap<String, LedgerEntry>>,

    /// Success report count (since startup)
    completed_count: RwLock<u64>,

    /// Failure report count (since startup)
    failed_count: RwLock<u64>,
}

impl TokenLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            completed_count: RwLock::new(0),
            failed_count: RwLock::new(0),
        }
    }

    /// Register a new work order under its token.
    ///
    /// Rejects tokens that are already tracked, whether in flight or
    /// terminal, so a token is never reused.
    pub fn begin(&self, token: &str, item_id: &str) -> Result<()> {
        let mut entries = self.entries.write();
        if entries.contains_key(token) {
            return Err(Error::duplicate_report(redact(token)));
        }
        entries.insert(token.to_string(), LedgerEntry::new(item_id.to_string()));
        Ok(())
    }

    /// Mark the order's work as running
    pub fn mark_running(&self, token: &str) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(token) {
            Some(entry) if entry.state == ExecutionState::Pending => {
                entry.state = ExecutionState::Running;
                entry.started_at = Some(Instant::now());
                true
            }
            _ => false,
        }
    }

    /// Atomically reserve the single report slot for a token.
    ///
    /// Returns `true` only for the first reservation; any later attempt,
    /// for either outcome, returns `false`.
    pub fn try_report(&self, token: &str, outcome: ReportOutcome) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(token) {
            Some(entry) if !entry.state.is_terminal() => {
                entry.state = ExecutionState::Reported(outcome);
                entry.reported_at = Some(Instant::now());
                match outcome {
                    ReportOutcome::Success => *self.completed_count.write() += 1,
                    ReportOutcome::Failure => *self.failed_count.write() += 1,
                }
                true
            }
            _ => false,
        }
    }

    /// Current state for a token
    pub fn state(&self, token: &str) -> Option<ExecutionState> {
        self.entries.read().get(token).map(|e| e.state)
    }

    /// Item id tracked under a token
    pub fn item_id(&self, token: &str) -> Option<String> {
        self.entries.read().get(token).map(|e| e.item_id.clone())
    }

    /// Execution time for a token in milliseconds
    pub fn execution_time_ms(&self, token: &str) -> u64 {
        self.entries
            .read()
            .get(token)
            .map(|e| e.execution_time_ms())
            .unwrap_or(0)
    }

    /// Count of orders not yet in a terminal state
    pub fn active_count(&self) -> usize {
        self.entries
            .read()
            .values()
            .filter(|e| !e.state.is_terminal())
            .count()
    }

    /// Total success reports
    pub fn completed_count(&self) -> u64 {
        *self.completed_count.read()
    }

    /// Total failure reports
    pub fn failed_count(&self) -> u64 {
        *self.failed_count.read()
    }
}

impl Default for TokenLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Truncate a raw token for error messages
fn redact(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}…({})", prefix, token.len())
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle() {
        let ledger = TokenLedger::new();

        ledger.begin("T1", "item-a").unwrap();
        assert_eq!(ledger.state("T1"), Some(ExecutionState::Pending));

        assert!(ledger.mark_running("T1"));
        assert_eq!(ledger.state("T1"), Some(ExecutionState::Running));
        assert_eq!(ledger.active_count(), 1);

        assert!(ledger.try_report("T1", ReportOutcome::Success));
        assert_eq!(
            ledger.state("T1"),
            Some(ExecutionState::Reported(ReportOutcome::Success))
        );
        assert_eq!(ledger.active_count(), 0);
        assert_eq!(ledger.completed_count(), 1);
    }

    #[test]
    fn test_token_never_reused() {
        let ledger = TokenLedger::new();
        ledger.begin("T1", "item-a").unwrap();

        let err = ledger.begin("T1", "item-b").unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::DuplicateReport);
    }

    #[test]
    fn test_single_report_slot() {
        let ledger = TokenLedger::new();
        ledger.begin("T1", "item-a").unwrap();
        ledger.mark_running("T1");

        assert!(ledger.try_report("T1", ReportOutcome::Failure));
        // Second report rejected regardless of outcome
        assert!(!ledger.try_report("T1", ReportOutcome::Failure));
        assert!(!ledger.try_report("T1", ReportOutcome::Success));

        assert_eq!(ledger.failed_count(), 1);
        assert_eq!(ledger.completed_count(), 0);
    }

    #[test]
    fn test_unknown_token_rejected() {
        let ledger = TokenLedger::new();
        assert!(!ledger.mark_running("T9"));
        assert!(!ledger.try_report("T9", ReportOutcome::Success));
        assert_eq!(ledger.state("T9"), None);
    }

    #[test]
    fn test_independent_tokens() {
        let ledger = TokenLedger::new();
        ledger.begin("T3", "item-a").unwrap();
        ledger.begin("T4", "item-b").unwrap();
        ledger.mark_running("T3");
        ledger.mark_running("T4");

        assert!(ledger.try_report("T4", ReportOutcome::Success));
        assert!(ledger.try_report("T3", ReportOutcome::Failure));

        assert_eq!(ledger.completed_count(), 1);
        assert_eq!(ledger.failed_count(), 1);
        assert_eq!(ledger.item_id("T3").as_deref(), Some("item-a"));
    }
}
