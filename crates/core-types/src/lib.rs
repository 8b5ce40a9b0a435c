//! Shared primitives for the Locus engine crates.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use uuid::Uuid;

/// Shared error type for the engine crates.
#[derive(Debug, Error, Clone)]
pub enum LocusError {
    #[error("{message}")]
    Message { message: String },
}

impl LocusError {
    pub fn new(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct CommandId(pub String);

impl CommandId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for CommandId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CommandId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One interactive element as seen by the perception step.
///
/// `element_id` is only unique inside the snapshot that produced it; the next
/// refresh may reuse or drop it.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementDescriptor {
    pub element_id: String,
    pub tag_name: String,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub role: Option<String>,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub text: Option<String>,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub attributes: HashMap<String, String>,
    #[cfg_attr(feature = "serde-full", serde(default))]
    pub selector_hints: Vec<String>,
}

impl ElementDescriptor {
    pub fn new(element_id: impl Into<String>, tag_name: impl Into<String>) -> Self {
        Self {
            element_id: element_id.into(),
            tag_name: tag_name.into(),
            ..Self::default()
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_selector_hint(mut self, selector: impl Into<String>) -> Self {
        self.selector_hints.push(selector.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    /// True for elements that accept free text entry.
    pub fn is_text_entry(&self) -> bool {
        matches!(
            self.tag_name.to_ascii_lowercase().as_str(),
            "input" | "textarea"
        )
    }
}

/// The three action kinds the executor understands.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "snake_case"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ActionKind {
    Click,
    Type,
    Navigate,
}

impl ActionKind {
    pub fn name(&self) -> &'static str {
        match self {
            ActionKind::Click => "click",
            ActionKind::Type => "type",
            ActionKind::Navigate => "navigate",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Locating strategies, highest confidence first.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum StrategyKind {
    DistilledId,
    TestId,
    AriaRole,
    Text,
    Css,
}

impl StrategyKind {
    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::DistilledId => "distilled_id",
            StrategyKind::TestId => "test_id",
            StrategyKind::AriaRole => "aria_role",
            StrategyKind::Text => "text",
            StrategyKind::Css => "css",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure taxonomy reported back to the planner.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde-full", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FailureKind {
    TimeoutOrStuck,
    AmbiguousLocator,
    /// Reserved; the executor never produces it.
    UnsupportedSurface,
    /// Reserved; the executor never produces it.
    SecurityBlock,
    GenericError,
}

impl FailureKind {
    pub fn name(&self) -> &'static str {
        match self {
            FailureKind::TimeoutOrStuck => "timeout_or_stuck",
            FailureKind::AmbiguousLocator => "ambiguous_locator",
            FailureKind::UnsupportedSurface => "unsupported_surface",
            FailureKind::SecurityBlock => "security_block",
            FailureKind::GenericError => "generic_error",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A planner-issued command.
///
/// Fields are optional so that a malformed command can still be represented
/// and answered with a `GenericError` result instead of being rejected at
/// parse time.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde-full",
    serde(tag = "action", rename_all = "snake_case")
)]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    Click {
        #[cfg_attr(feature = "serde-full", serde(default))]
        element_id: Option<String>,
    },
    Type {
        #[cfg_attr(feature = "serde-full", serde(default))]
        element_id: Option<String>,
        #[cfg_attr(feature = "serde-full", serde(default))]
        text_content: Option<String>,
    },
    Navigate {
        #[cfg_attr(feature = "serde-full", serde(default))]
        url: Option<String>,
    },
}

impl Command {
    pub fn click(element_id: impl Into<String>) -> Self {
        Command::Click {
            element_id: Some(element_id.into()),
        }
    }

    pub fn type_text(element_id: impl Into<String>, text: impl Into<String>) -> Self {
        Command::Type {
            element_id: Some(element_id.into()),
            text_content: Some(text.into()),
        }
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Command::Navigate {
            url: Some(url.into()),
        }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            Command::Click { .. } => ActionKind::Click,
            Command::Type { .. } => ActionKind::Type,
            Command::Navigate { .. } => ActionKind::Navigate,
        }
    }

    /// Element id, with empty strings treated as absent.
    pub fn element_id(&self) -> Option<&str> {
        match self {
            Command::Click { element_id } | Command::Type { element_id, .. } => {
                element_id.as_deref().filter(|id| !id.is_empty())
            }
            Command::Navigate { .. } => None,
        }
    }
}

/// Outcome of one command. Built only through [`InteractionResult::success`]
/// and [`InteractionResult::failure`] so that `success` and `failure_kind`
/// never disagree.
#[cfg_attr(feature = "serde-full", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InteractionResult {
    pub command_id: CommandId,
    pub success: bool,
    pub action: ActionKind,
    pub element_id: Option<String>,
    pub locator_kind: Option<StrategyKind>,
    pub url_after: Option<String>,
    pub progress_signal: Option<String>,
    pub failure_kind: Option<FailureKind>,
    pub failure_reason: Option<String>,
    pub attempted_selectors: Option<Vec<String>>,
    pub elapsed_ms: u64,
}

impl InteractionResult {
    pub fn success(command_id: CommandId, action: ActionKind, progress_signal: &str) -> Self {
        Self {
            command_id,
            success: true,
            action,
            element_id: None,
            locator_kind: None,
            url_after: None,
            progress_signal: Some(progress_signal.to_string()),
            failure_kind: None,
            failure_reason: None,
            attempted_selectors: None,
            elapsed_ms: 0,
        }
    }

    pub fn failure(
        command_id: CommandId,
        action: ActionKind,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            command_id,
            success: false,
            action,
            element_id: None,
            locator_kind: None,
            url_after: None,
            progress_signal: None,
            failure_kind: Some(kind),
            failure_reason: Some(reason.into()),
            attempted_selectors: None,
            elapsed_ms: 0,
        }
    }

    pub fn with_element(mut self, element_id: Option<&str>) -> Self {
        self.element_id = element_id.map(str::to_string);
        self
    }

    pub fn with_locator(mut self, kind: Option<StrategyKind>) -> Self {
        self.locator_kind = kind;
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url_after = url;
        self
    }

    pub fn with_attempted(mut self, selectors: Vec<String>) -> Self {
        self.attempted_selectors = if selectors.is_empty() {
            None
        } else {
            Some(selectors)
        };
        self
    }

    pub fn with_elapsed(mut self, elapsed_ms: u64) -> Self {
        self.elapsed_ms = elapsed_ms;
        self
    }

    pub fn is_consistent(&self) -> bool {
        self.success == self.failure_kind.is_none()
    }
}
