//! Type definitions for the Batchflow worker
//!
//! This module contains the data model shared across the worker:
//! work items, continuation tokens, work orders, and execution results.

mod task;

pub use task::*;
