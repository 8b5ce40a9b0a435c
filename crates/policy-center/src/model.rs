use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::PolicyError;

#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct PolicySnapshot {
    pub rev: u64,
    pub execution: ExecutionPolicy,
    pub retry: RetryPolicy,
    pub locator: LocatorPolicy,
    pub provenance: HashMap<String, PolicyProvenance>,
}

/// Budgets applied to a single command.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ExecutionPolicy {
    /// Shared deadline for resolution and the action itself.
    pub command_budget_ms: u64,
    /// Best-effort wait for the page to settle after a click.
    pub settle_timeout_ms: u64,
    /// Read the field back after a non-secret fill.
    pub verify_fill: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Sleep before each additional resolution pass.
    pub backoff_ms: Vec<u64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LocatorPolicy {
    /// Perception-injected identity attributes, most preferred first.
    pub identity_attributes: Vec<String>,
    /// Stable test-oriented attributes.
    pub test_id_attributes: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PolicyProvenance {
    pub path: String,
    pub source: PolicySource,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum PolicySource {
    Builtin,
    File,
    Env,
}

/// Read-only view handed to the engine crates.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PolicyView {
    pub rev: u64,
    pub execution: ExecutionPolicy,
    pub retry: RetryPolicy,
    pub locator: LocatorPolicy,
}

impl PolicyView {
    pub fn command_budget(&self) -> Duration {
        Duration::from_millis(self.execution.command_budget_ms)
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.execution.settle_timeout_ms)
    }

    pub fn backoff(&self) -> Vec<Duration> {
        self.retry
            .backoff_ms
            .iter()
            .copied()
            .map(Duration::from_millis)
            .collect()
    }
}

impl Default for PolicyView {
    fn default() -> Self {
        PolicyView::from(crate::defaults::default_snapshot())
    }
}

impl From<PolicySnapshot> for PolicyView {
    fn from(snapshot: PolicySnapshot) -> Self {
        Self {
            rev: snapshot.rev,
            execution: snapshot.execution,
            retry: snapshot.retry,
            locator: snapshot.locator,
        }
    }
}

impl PolicySnapshot {
    pub fn set_provenance(&mut self, path: &str, source: PolicySource) {
        self.provenance.insert(
            path.to_string(),
            PolicyProvenance {
                path: path.to_string(),
                source,
            },
        );
    }

    pub fn validate(&self) -> Result<(), PolicyError> {
        if self.execution.command_budget_ms == 0 {
            return Err(PolicyError::Invalid(
                "execution.command_budget_ms must be > 0".to_string(),
            ));
        }
        if self.retry.backoff_ms.is_empty() {
            return Err(PolicyError::Invalid(
                "retry.backoff_ms must list at least one delay".to_string(),
            ));
        }
        Ok(())
    }
}
