//! Pass-through workflow steps
//!
//! The steps around the batch task in the orchestrator's state machine:
//! initialization and the success/failure notifications. These carry no
//! continuation token; they stamp or log and hand the item back for the
//! orchestrator to route.

use std::fmt;
use std::str::FromStr;

use tracing::{info, warn};

use crate::error::Error;
use crate::types::{WorkItem, INITIALIZE_STATUS_FIELD, STATUS_SUCCESS};

// ─────────────────────────────────────────────────────────────────
// Step Selection
// ─────────────────────────────────────────────────────────────────

/// Pass-through steps invocable by the hosting runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Prepare the item before the batch task runs
    Initialize,
    /// Announce a completed workflow instance
    NotifySuccess,
    /// Announce a failed workflow instance
    NotifyFailure,
}

impl Step {
    /// All steps, for help text
    pub fn all() -> &'static [Step] {
        &[Step::Initialize, Step::NotifySuccess, Step::NotifyFailure]
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Initialize => write!(f, "initialize"),
            Step::NotifySuccess => write!(f, "notify-success"),
            Step::NotifyFailure => write!(f, "notify-failure"),
        }
    }
}

impl FromStr for Step {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "initialize" => Ok(Step::Initialize),
            "notify-success" => Ok(Step::NotifySuccess),
            "notify-failure" => Ok(Step::NotifyFailure),
            other => Err(Error::NotSupported(format!(
                "unknown step '{}' (expected one of: initialize, notify-success, notify-failure)",
                other
            ))),
        }
    }
}

// ─────────────────────────────────────────────────────────────────
// Step Execution
// ─────────────────────────────────────────────────────────────────

/// Run a pass-through step on an item and return the item
pub fn run_step(step: Step, mut item: WorkItem) -> WorkItem {
    match step {
        Step::Initialize => {
            item.stamp_status(INITIALIZE_STATUS_FIELD, STATUS_SUCCESS);
            info!(item_id = %item.id, "Initialization completed");
        }
        Step::NotifySuccess => {
            info!(item_id = %item.id, "Success notification dispatched");
        }
        Step::NotifyFailure => {
            warn!(item_id = %item.id, "Failure notification dispatched");
        }
    }
    item
}

// ─────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────
