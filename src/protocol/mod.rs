//! Protocol module for orchestrator callbacks
//!
//! Defines the report messages and serialization for the worker side of
//! the callback channel. Reports are JSON with a type discriminator.

mod messages;

pub use messages::*;
