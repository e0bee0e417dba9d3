//! Task executor module
//!
//! Handles the execution lifecycle of a work order:
//! - Running the injected work function
//! - Tracking per-token execution state
//! - Reporting exactly one result per continuation token

mod runner;
mod state;

pub use runner::*;
pub use state::*;
