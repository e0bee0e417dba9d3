//! Work function trait definition
//!
//! Defines the WorkFunction trait the executor invokes. The trait is
//! object-safe so hosts can inject any implementation.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::WorkItem;

/// Core trait for units of work.
///
/// An implementation performs the task described by the item and returns
/// the (possibly augmented) item as its output. Errors are ordinary
/// `Err` returns; the executor converts them into failure reports. The
/// work may suspend on I/O without blocking other invocations.
#[async_trait]
pub trait WorkFunction: Send + Sync {
    /// Get the work function name (e.g., "batch", "mock")
    fn name(&self) -> &'static str;

    /// Perform the work described by the item
    async fn run(&self, item: WorkItem) -> Result<WorkItem>;
}
