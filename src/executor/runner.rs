//! Work order execution runner
//!
//! Runs the injected work function and reports exactly one result per
//! continuation token through the injected callback channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinError;
use tracing::{error, info};

use crate::callback::CallbackChannel;
use crate::error::{Error, Result};
use crate::executor::{ReportOutcome, TokenLedger};
use crate::types::{
    ContinuationToken, ExecutionResult, WorkItem, WorkOrder, BATCH_STATUS_FIELD, STATUS_SUCCESS,
};
use crate::work::WorkFunction;

// ─────────────────────────────────────────────────────────────────
// Executor Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for the task executor
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Work deadline in seconds (0 = no deadline)
    pub work_timeout_secs: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            work_timeout_secs: 0,
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Task Executor
// ─────────────────────────────────────────────────────────────────

/// Executes work orders and reports results to the orchestrator.
///
/// Invocations are independent; `execute` may be called concurrently for
/// different tokens. The only shared state is the token ledger, which
/// enforces the at-most-once report invariant.
pub struct TaskExecutor {
    config: ExecutorConfig,
    work: Arc<dyn WorkFunction>,
    callback: Arc<dyn CallbackChannel>,
    ledger: Arc<TokenLedger>,
}

impl TaskExecutor {
    /// Create a new task executor
    pub fn new(
        config: ExecutorConfig,
        work: Arc<dyn WorkFunction>,
        callback: Arc<dyn CallbackChannel>,
    ) -> Self {
        Self {
            config,
            work,
            callback,
            ledger: Arc::new(TokenLedger::new()),
        }
    }

    /// Get the token ledger
    pub fn ledger(&self) -> Arc<TokenLedger> {
        self.ledger.clone()
    }

    /// Execute one work order and report its result.
    ///
    /// On completion the success callback receives the token and the item
    /// with `BATCH_STATUS` stamped; any work failure (error, deadline, or
    /// panic) becomes a failure report instead. Exactly one callback is
    /// made per invocation. A callback delivery error is returned to the
    /// caller; it is never retried here and never swallowed.
    pub async fn execute(&self, order: WorkOrder) -> Result<ExecutionResult> {
        let token = order.token.ok_or(Error::TokenMissing)?;
        let item = order.item;

        self.ledger.begin(token.as_str(), &item.id)?;
        self.ledger.mark_running(token.as_str());
        info!(
            item_id = %item.id,
            token = %token,
            work = self.work.name(),
            "Work order started"
        );

        match self.run_work(item.clone()).await {
            Ok(mut output) => {
                output.stamp_status(BATCH_STATUS_FIELD, STATUS_SUCCESS);
                let serialized = serde_json::to_string(&output)
                    .map_err(|e| Error::Internal(format!("Failed to serialize output: {}", e)))?;

                self.reserve(&token, ReportOutcome::Success)?;
                self.callback.report_success(&token, &serialized).await?;

                info!(
                    item_id = %output.id,
                    token = %token,
                    execution_ms = self.ledger.execution_time_ms(token.as_str()),
                    "Success reported"
                );

                Ok(ExecutionResult::Success {
                    output: output.to_value(),
                })
            }
            Err(work_err) => {
                let detail = failure_detail(&work_err);
                error!(
                    token = %token,
                    error = %work_err,
                    "Work failed, reporting failure"
                );

                self.reserve(&token, ReportOutcome::Failure)?;
                self.callback
                    .report_failure(&token, &detail, &detail)
                    .await?;

                Ok(ExecutionResult::Failure {
                    error: detail.clone(),
                    cause: detail,
                })
            }
        }
    }

    /// Run the work function on its own task, with an optional deadline.
    ///
    /// Spawning isolates the executor from a panicking work future; the
    /// panic is converted into a work error instead of propagating.
    async fn run_work(&self, item: WorkItem) -> Result<WorkItem> {
        let item_id = item.id.clone();
        let work = self.work.clone();
        let mut handle = tokio::spawn(async move { work.run(item).await });

        let joined = if self.config.work_timeout_secs == 0 {
            (&mut handle).await
        } else {
            let deadline = Duration::from_secs(self.config.work_timeout_secs);
            match tokio::time::timeout(deadline, &mut handle).await {
                Ok(joined) => joined,
                Err(_) => {
                    handle.abort();
                    return Err(Error::WorkTimeout {
                        item_id,
                        timeout_secs: self.config.work_timeout_secs,
                    });
                }
            }
        };

        match joined {
            Ok(result) => result,
            Err(join_err) => Err(Error::work_panicked(panic_message(join_err))),
        }
    }

    /// Reserve the single report slot for a token
    fn reserve(&self, token: &ContinuationToken, outcome: ReportOutcome) -> Result<()> {
        if !self.ledger.try_report(token.as_str(), outcome) {
            return Err(Error::duplicate_report(token.redacted()));
        }
        Ok(())
    }
}

/// Extract the raw failure message for the report body
fn failure_detail(err: &Error) -> String {
    match err {
        Error::WorkFailed { message, .. } => message.clone(),
        Error::WorkPanicked { message } => message.clone(),
        other => other.to_string(),
    }
}

/// Extract a panic payload message from a join error
fn panic_message(join_err: JoinError) -> String {
    match join_err.try_into_panic() {
        Ok(payload) => {
            if let Some(s) = payload.downcast_ref::<&str>() {
                (*s).to_string()
            } else if let Some(s) = payload.downcast_ref::<String>() {
                s.clone()
            } else {
                "work task panicked".to_string()
            }
        }
        Err(_) => "work task aborted".to_string(),
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{InMemoryCallback, RecordedReport};
    use crate::work::{MockWork, MockWorkConfig};

    fn make_executor(
        work: MockWork,
        callback: Arc<InMemoryCallback>,
    ) -> TaskExecutor {
        TaskExecutor::new(ExecutorConfig::default(), Arc::new(work), callback)
    }

    #[tokio::test]
    async fn test_success_reported_exactly_once() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(MockWork::new(), callback.clone());

        let order = WorkOrder::new(WorkItem::new("A"), "T1");
        let result = executor.execute(order).await.unwrap();

        match result {
            ExecutionResult::Success { output } => {
                assert_eq!(output["BATCH_STATUS"], serde_json::json!("SUCCESS"));
            }
            other => panic!("expected success, got {:?}", other),
        }

        let reports = callback.reports_for("T1");
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            RecordedReport::Success { output, .. } => {
                assert!(output.contains("\"id\":\"A\""));
                assert!(output.contains("BATCH_STATUS"));
            }
            other => panic!("expected success report, got {:?}", other),
        }
        assert_eq!(callback.failure_count(), 0);
    }

    #[tokio::test]
    async fn test_failure_reported_exactly_once() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(MockWork::failing("disk full"), callback.clone());

        let order = WorkOrder::new(WorkItem::new("B"), "T2");
        let result = executor.execute(order).await.unwrap();
        assert!(!result.is_success());

        // Failure report carries the raw message as both error and cause
        let reports = callback.reports_for("T2");
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0],
            RecordedReport::Failure {
                token: "T2".to_string(),
                error: "disk full".to_string(),
                cause: "disk full".to_string(),
            }
        );
        assert_eq!(callback.success_count(), 0);
    }

    #[tokio::test]
    async fn test_no_token_reaches_both_callbacks() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(MockWork::failing("boom"), callback.clone());

        executor
            .execute(WorkOrder::new(WorkItem::new("B"), "T2"))
            .await
            .unwrap();

        // A second order reusing the token is rejected before any report
        let err = executor
            .execute(WorkOrder::new(WorkItem::new("B2"), "T2"))
            .await
            .unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::DuplicateReport);

        assert_eq!(callback.reports_for("T2").len(), 1);
        assert_eq!(callback.success_count(), 0);
    }

    #[tokio::test]
    async fn test_panic_becomes_failure_report() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(MockWork::panicking("index out of range"), callback.clone());

        let result = executor
            .execute(WorkOrder::new(WorkItem::new("C"), "T5"))
            .await
            .unwrap();

        assert!(!result.is_success());
        let reports = callback.reports_for("T5");
        assert_eq!(reports.len(), 1);
        match &reports[0] {
            RecordedReport::Failure { cause, .. } => {
                assert!(cause.contains("index out of range"));
            }
            other => panic!("expected failure report, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_callback_failure_propagates() {
        let callback = Arc::new(InMemoryCallback::failing());
        let executor = make_executor(MockWork::new(), callback.clone());

        let err = executor
            .execute(WorkOrder::new(WorkItem::new("A"), "T1"))
            .await
            .unwrap_err();

        assert!(err.is_callback_error());
        assert!(callback.reports().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_orders_report_independently() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(
            MockWork::with_config(MockWorkConfig {
                latency: Duration::from_millis(10),
                ..Default::default()
            }),
            callback.clone(),
        );

        let (r3, r4) = tokio::join!(
            executor.execute(WorkOrder::new(WorkItem::new("a"), "T3")),
            executor.execute(WorkOrder::new(WorkItem::new("b"), "T4")),
        );
        assert!(tokio_test::assert_ok!(r3).is_success());
        assert!(tokio_test::assert_ok!(r4).is_success());

        assert_eq!(callback.reports_for("T3").len(), 1);
        assert_eq!(callback.reports_for("T4").len(), 1);
        assert_eq!(executor.ledger().completed_count(), 2);
    }

    #[tokio::test]
    async fn test_missing_token_rejected() {
        let callback = Arc::new(InMemoryCallback::new());
        let executor = make_executor(MockWork::new(), callback.clone());

        let order = WorkOrder {
            token: None,
            item: WorkItem::new("A"),
        };
        let err = executor.execute(order).await.unwrap_err();
        assert_eq!(err.code(), crate::error::ErrorCode::TokenMissing);
        assert!(callback.reports().is_empty());
    }

    #[tokio::test]
    async fn test_deadline_becomes_failure_report() {
        let callback = Arc::new(InMemoryCallback::new());
        let work = MockWork::with_config(MockWorkConfig {
            latency: Duration::from_secs(30),
            ..Default::default()
        });
        let executor = TaskExecutor::new(
            ExecutorConfig {
                work_timeout_secs: 1,
            },
            Arc::new(work),
            callback.clone(),
        );

        let result = executor
            .execute(WorkOrder::new(WorkItem::new("slow"), "T1"))
            .await
            .unwrap();

        assert!(!result.is_success());
        assert_eq!(callback.failure_count(), 1);
        assert_eq!(callback.success_count(), 0);
    }

    #[test]
    fn test_executor_config_default() {
        let config = ExecutorConfig::default();
        assert_eq!(config.work_timeout_secs, 0);
    }
}
