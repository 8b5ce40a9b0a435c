//! Error types for action primitives

use locus_core_types::LocusError;
use thiserror::Error;

/// Errors surfaced by a [`crate::PagePort`] implementation
#[derive(Debug, Error, Clone)]
pub enum ActionError {
    /// The operation did not finish inside the time it was given
    #[error("Timeout: {0}")]
    Timeout(String),

    /// The page rejected the locator (bad selector or unknown role)
    #[error("Invalid locator: {0}")]
    InvalidLocator(String),

    /// Element is not clickable or editable (obscured, disabled, detached)
    #[error("Element not interactable: {0}")]
    NotInteractable(String),

    /// Navigation failed before the page committed
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// Transport or protocol failure talking to the browser
    #[error("Browser I/O error: {0}")]
    Io(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ActionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, ActionError::Timeout(_))
    }
}

impl From<ActionError> for LocusError {
    fn from(err: ActionError) -> Self {
        LocusError::new(err.to_string())
    }
}
