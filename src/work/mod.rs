//! Work capability module
//!
//! Provides the core abstraction for the unit of work the executor runs,
//! and implementations for production and testing.

mod batch;
mod mock;
mod traits;

pub use batch::{BatchWork, BatchWorkConfig};
pub use mock::{MockWork, MockWorkConfig};
pub use traits::*;
