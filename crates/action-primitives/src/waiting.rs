//! Built-in waiting mechanisms for action primitives

use std::time::Duration;
use tracing::{debug, warn};

use crate::page::PagePort;

/// Best-effort wait for the page to settle after an action.
///
/// Never fails: a page that keeps the network busy or errors out simply
/// ends the wait.
#[derive(Clone, Copy, Debug)]
pub struct SettleWait {
    /// Upper bound on the wait
    pub timeout: Duration,
}

impl Default for SettleWait {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(2_000),
        }
    }
}

impl SettleWait {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Run the wait, capped at `cap` when the command has less budget left.
    ///
    /// Returns whether the page reported settled.
    pub async fn run(&self, page: &dyn PagePort, cap: Duration) -> bool {
        let timeout = self.timeout.min(cap);
        if timeout.is_zero() {
            debug!("Settle wait skipped, no budget left");
            return false;
        }

        match tokio::time::timeout(timeout, page.wait_for_settle(timeout)).await {
            Ok(Ok(())) => {
                debug!(timeout_ms = timeout.as_millis() as u64, "Page settled");
                true
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Settle wait failed, continuing");
                false
            }
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "Settle wait timed out, continuing"
                );
                false
            }
        }
    }
}
