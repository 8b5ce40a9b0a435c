//! Command execution error types

use action_locator::LocatorError;
use action_primitives::ActionError;
use locus_core_types::{FailureKind, StrategyKind};
use thiserror::Error;

/// Reasons a command step stops before reporting success
#[derive(Debug, Error)]
pub enum FlowError {
    /// Required command field absent or empty
    #[error("{0}")]
    MissingField(&'static str),

    /// Target could not be resolved to a unique visible element
    #[error(transparent)]
    Locator(#[from] LocatorError),

    /// Action ran out of budget
    #[error("{0} timed out")]
    Timeout(&'static str),

    /// Page rejected the action
    #[error(transparent)]
    Action(#[from] ActionError),
}

impl FlowError {
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            FlowError::Locator(err) => err.failure_kind(),
            FlowError::Timeout(_) => FailureKind::TimeoutOrStuck,
            FlowError::MissingField(_) | FlowError::Action(_) => FailureKind::GenericError,
        }
    }

    /// Selectors probed before the failure, if resolution ran
    pub fn attempted(&self) -> &[String] {
        match self {
            FlowError::Locator(err) => err.attempted(),
            _ => &[],
        }
    }
}

/// A failed step together with what was known when it stopped
#[derive(Debug)]
pub struct StepFailure {
    pub error: FlowError,
    pub element_id: Option<String>,
    pub locator: Option<StrategyKind>,
    pub url_after: Option<String>,
}

impl StepFailure {
    pub fn new(error: impl Into<FlowError>) -> Self {
        Self {
            error: error.into(),
            element_id: None,
            locator: None,
            url_after: None,
        }
    }

    pub fn element(mut self, element_id: &str) -> Self {
        self.element_id = Some(element_id.to_string());
        self
    }

    pub fn locator(mut self, kind: StrategyKind) -> Self {
        self.locator = Some(kind);
        self
    }

    pub fn url(mut self, url: String) -> Self {
        self.url_after = Some(url);
        self
    }
}

impl From<FlowError> for StepFailure {
    fn from(error: FlowError) -> Self {
        StepFailure::new(error)
    }
}
