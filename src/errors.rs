//! Error handling module
//!
//! Errors of the engine facade itself. Command failures are never errors;
//! they come back in-band as an `InteractionResult`.

use locus_core_types::LocusError;
use locus_policy_center::PolicyError;
use locus_privacy::PrivacyError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Secret registration rejected
    #[error("secret registration failed: {0}")]
    Secret(#[from] PrivacyError),

    /// Policy could not be loaded or validated
    #[error("invalid engine policy: {0}")]
    Policy(#[from] PolicyError),
}

impl From<EngineError> for LocusError {
    fn from(err: EngineError) -> Self {
        LocusError::new(err.to_string())
    }
}
