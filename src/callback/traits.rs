//! Callback channel trait definition

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ContinuationToken;

/// Channel for reporting step results back to the orchestrator.
///
/// Both operations are at-most-once intent: the executor calls exactly one
/// of them per token and never retries. Delivery failures are returned to
/// the caller, not absorbed; redelivery is the hosting platform's call.
#[async_trait]
pub trait CallbackChannel: Send + Sync {
    /// Get the channel name (e.g., "http", "memory")
    fn name(&self) -> &'static str;

    /// Report successful completion with a serialized output payload
    async fn report_success(&self, token: &ContinuationToken, output: &str) -> Result<()>;

    /// Report failure with an error summary and human-readable cause
    async fn report_failure(
        &self,
        token: &ContinuationToken,
        error: &str,
        cause: &str,
    ) -> Result<()>;
}
