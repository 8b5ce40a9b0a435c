//! Core data types for action primitives

use locus_core_types::CommandId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::clock::Clock;

/// Execution context for one command
///
/// Carries the single deadline every step of the command draws from:
/// resolution probes, retry sleeps and the final action.
#[derive(Clone)]
pub struct ExecCtx {
    /// Unique identifier used to correlate logs and the result
    pub command_id: CommandId,

    /// When the command was accepted
    pub started_at: Instant,

    /// Hard cutoff; never extended
    pub deadline: Instant,

    /// Time source the deadline is measured against
    pub clock: Arc<dyn Clock>,
}

impl ExecCtx {
    /// Create a context whose deadline is `budget` from now
    pub fn new(clock: Arc<dyn Clock>, budget: Duration) -> Self {
        let started_at = clock.now();
        Self {
            command_id: CommandId::new(),
            started_at,
            deadline: started_at + budget,
            clock,
        }
    }

    /// Check if this context has exceeded its deadline
    pub fn is_timeout(&self) -> bool {
        self.clock.now() >= self.deadline
    }

    /// Get remaining time until deadline
    pub fn remaining_time(&self) -> Duration {
        self.deadline.saturating_duration_since(self.clock.now())
    }

    /// Time spent since the command was accepted
    pub fn elapsed(&self) -> Duration {
        self.clock.now().saturating_duration_since(self.started_at)
    }
}

impl fmt::Debug for ExecCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecCtx")
            .field("command_id", &self.command_id)
            .field("remaining", &self.remaining_time())
            .finish()
    }
}

/// Description of how to find one element on the live page
///
/// Building a spec never touches the page; it is only evaluated when a
/// [`crate::PagePort`] probes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LocatorSpec {
    /// Raw CSS selector
    Css(String),

    /// ARIA role with optional accessible name
    Role { role: String, name: Option<String> },

    /// Text-entry element by its placeholder attribute
    Placeholder(String),

    /// Element whose text matches
    Text { text: String, exact: bool },

    /// Element of `tag` containing `text`
    TagWithText { tag: String, text: String },
}

impl LocatorSpec {
    /// CSS attribute selector `[key='value']` with the value escaped
    pub fn attribute(key: &str, value: &str) -> Self {
        LocatorSpec::Css(format!("[{}='{}']", key, escape_css_string(value)))
    }
}

impl fmt::Display for LocatorSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocatorSpec::Css(selector) => f.write_str(selector),
            LocatorSpec::Role { role, name: None } => write!(f, "role={}", role),
            LocatorSpec::Role {
                role,
                name: Some(name),
            } => write!(f, "role={}[name={}]", role, quote(name)),
            LocatorSpec::Placeholder(text) => write!(f, "placeholder={}", quote(text)),
            LocatorSpec::Text { text, exact: true } => write!(f, "text={}", quote(text)),
            LocatorSpec::Text { text, exact: false } => write!(f, "text={}i", quote(text)),
            LocatorSpec::TagWithText { tag, text } => {
                write!(f, "{}:has-text({})", tag, quote(text))
            }
        }
    }
}

fn quote(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

fn escape_css_string(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn attribute_spec_escapes_quotes() {
        let spec = LocatorSpec::attribute("data-testid", "it's");
        assert_eq!(spec.to_string(), r"[data-testid='it\'s']");
    }

    #[test]
    fn display_forms() {
        let role = LocatorSpec::Role {
            role: "button".into(),
            name: Some("Say \"hi\"".into()),
        };
        assert_eq!(role.to_string(), r#"role=button[name="Say \"hi\""]"#);
        assert_eq!(
            LocatorSpec::Role {
                role: "link".into(),
                name: None
            }
            .to_string(),
            "role=link"
        );
        assert_eq!(
            LocatorSpec::Text {
                text: "Search".into(),
                exact: true
            }
            .to_string(),
            r#"text="Search""#
        );
        assert_eq!(
            LocatorSpec::TagWithText {
                tag: "button".into(),
                text: "Go".into()
            }
            .to_string(),
            r#"button:has-text("Go")"#
        );
    }

    #[test]
    fn ctx_tracks_remaining_budget() {
        let clock = Arc::new(ManualClock::new());
        let ctx = ExecCtx::new(clock.clone(), Duration::from_secs(20));
        assert_eq!(ctx.remaining_time(), Duration::from_secs(20));
        clock.advance(Duration::from_secs(7));
        assert_eq!(ctx.remaining_time(), Duration::from_secs(13));
        assert_eq!(ctx.elapsed(), Duration::from_secs(7));
        clock.advance(Duration::from_secs(30));
        assert!(ctx.is_timeout());
        assert_eq!(ctx.remaining_time(), Duration::ZERO);
    }
}
