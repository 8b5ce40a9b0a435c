//! Core types for locator system

use action_primitives::LocatorSpec;
use locus_core_types::StrategyKind;

/// One way of re-finding a descriptor's element on the live page
///
/// Produced by the strategy generator; nothing is queried until the
/// resolver probes `spec`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorCandidate {
    /// Strategy that produced this candidate
    pub kind: StrategyKind,

    /// How to find the element
    pub spec: LocatorSpec,
}

impl LocatorCandidate {
    pub fn new(kind: StrategyKind, spec: LocatorSpec) -> Self {
        Self { kind, spec }
    }

    /// Rendered selector used in logs and attempted-selector lists
    pub fn selector(&self) -> String {
        self.spec.to_string()
    }
}

/// A locator that matched exactly one visible element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocator {
    /// Winning strategy
    pub strategy: StrategyKind,

    /// Locator to act on
    pub spec: LocatorSpec,

    /// Resolution passes run, the successful one included
    pub passes: u32,

    /// Selectors probed, in first-seen order
    pub attempted: Vec<String>,
}

impl ResolvedLocator {
    /// Whether the element was found without any retry
    pub fn first_pass(&self) -> bool {
        self.passes <= 1
    }
}
