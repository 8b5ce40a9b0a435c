//! Error types for locator system

use locus_core_types::{FailureKind, LocusError};
use thiserror::Error;

/// Locator error enumeration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LocatorError {
    /// Element id absent from the store even after a refresh
    #[error("Element ID {element_id} not found in perception map.")]
    NotFound {
        element_id: String,
        attempted: Vec<String>,
    },

    /// Some strategy matched more than one live element
    #[error("Ambiguous locator found (matches multiple elements): {selector}")]
    Ambiguous {
        selector: String,
        attempted: Vec<String>,
    },

    /// Retries or budget exhausted without a unique visible match
    #[error("Could not resolve valid locator after retries.")]
    Unresolved { attempted: Vec<String> },

    /// Perception callback failed during a refresh
    #[error("Perception refresh failed: {0}")]
    Perception(String),
}

impl LocatorError {
    /// Classification reported to the planner
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            LocatorError::Ambiguous { .. } => FailureKind::AmbiguousLocator,
            LocatorError::NotFound { .. } | LocatorError::Unresolved { .. } => {
                FailureKind::TimeoutOrStuck
            }
            LocatorError::Perception(_) => FailureKind::GenericError,
        }
    }

    /// Selectors probed before giving up, in first-seen order
    pub fn attempted(&self) -> &[String] {
        match self {
            LocatorError::NotFound { attempted, .. }
            | LocatorError::Ambiguous { attempted, .. }
            | LocatorError::Unresolved { attempted } => attempted,
            LocatorError::Perception(_) => &[],
        }
    }
}

impl From<LocatorError> for LocusError {
    fn from(err: LocatorError) -> Self {
        LocusError::new(err.to_string())
    }
}
