//! Browser capability port

use async_trait::async_trait;
use std::time::Duration;

use crate::errors::ActionError;
use crate::types::LocatorSpec;

/// Capability adapter the engine drives a single live page through.
///
/// Implementations own the browser connection. Every call that can block
/// takes an explicit timeout carved out of the command budget.
#[async_trait]
pub trait PagePort: Send + Sync {
    /// Number of elements currently matching `spec`
    async fn count(&self, spec: &LocatorSpec) -> Result<usize, ActionError>;

    /// Whether the first element matching `spec` is visible
    async fn is_visible(&self, spec: &LocatorSpec) -> Result<bool, ActionError>;

    async fn click(&self, spec: &LocatorSpec, timeout: Duration) -> Result<(), ActionError>;

    /// Replace the value of a text-entry element
    async fn fill(
        &self,
        spec: &LocatorSpec,
        text: &str,
        timeout: Duration,
    ) -> Result<(), ActionError>;

    /// Current value of a text-entry element
    async fn input_value(&self, spec: &LocatorSpec) -> Result<String, ActionError>;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<(), ActionError>;

    /// Wait until network activity quiets down
    async fn wait_for_settle(&self, timeout: Duration) -> Result<(), ActionError>;

    /// URL of the page as of now
    async fn current_url(&self) -> String;
}
