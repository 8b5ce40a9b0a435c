//! Locus library
//!
//! Resolves perception-supplied element ids against a live page and runs
//! click, type and navigate commands under one bounded budget. Every command
//! answers with a typed [`InteractionResult`]; nothing raises past
//! [`InteractionEngine::execute_command`].

pub mod config;
pub mod engine;
pub mod errors;
pub mod telemetry;

pub use engine::{EngineBuilder, InteractionEngine};
pub use errors::EngineError;

// Re-export commonly used types for external use
pub use action_locator::PerceptionSource;
pub use action_primitives::{ActionError, Clock, LocatorSpec, PagePort, TokioClock};
pub use locus_core_types::{
    ActionKind, Command, CommandId, ElementDescriptor, FailureKind, InteractionResult,
    StrategyKind,
};
pub use locus_policy_center::PolicyView;
