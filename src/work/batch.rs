//! Chunked batch work implementation
//!
//! Production stand-in for long-running batch processing: works through
//! the item in a configurable number of chunks, suspending between chunks.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::error::Result;
use crate::types::WorkItem;

use super::WorkFunction;

// ─────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────

/// Configuration for batch work behavior
#[derive(Debug, Clone)]
pub struct BatchWorkConfig {
    /// Number of chunks to process the item in
    pub chunks: u32,

    /// Suspension between chunks (stands in for I/O-bound work)
    pub chunk_delay: Duration,
}

impl Default for BatchWorkConfig {
    fn default() -> Self {
        Self {
            chunks: 4,
            chunk_delay: Duration::from_millis(50),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Batch Work
// ─────────────────────────────────────────────────────────────────

/// Processes a work item in sequential chunks
pub struct BatchWork {
    config: BatchWorkConfig,
}

impl BatchWork {
    /// Create batch work with default configuration
    pub fn new() -> Self {
        Self::with_config(BatchWorkConfig::default())
    }

    /// Create batch work with custom configuration
    pub fn with_config(config: BatchWorkConfig) -> Self {
        Self { config }
    }
}

impl Default for BatchWork {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WorkFunction for BatchWork {
    fn name(&self) -> &'static str {
        "batch"
    }

    async fn run(&self, item: WorkItem) -> Result<WorkItem> {
        let started = Instant::now();

        for chunk in 1..=self.config.chunks {
            if !self.config.chunk_delay.is_zero() {
                tokio::time::sleep(self.config.chunk_delay).await;
            }
            debug!(
                item_id = %item.id,
                chunk = chunk,
                total = self.config.chunks,
                "Chunk processed"
            );
        }

        info!(
            item_id = %item.id,
            chunks = self.config.chunks,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch work completed"
        );

        Ok(item)
    }
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
