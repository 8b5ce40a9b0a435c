//! Command execution layer
//!
//! This module turns one planner command into one interaction result:
//! resolve the target through the locator, act on the page within the
//! command deadline, and classify every failure in-band.

pub mod errors;
pub mod executor;

pub use errors::{FlowError, StepFailure};
pub use executor::{CommandExecutor, DefaultCommandExecutor};
