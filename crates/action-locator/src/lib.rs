//! Element location for Locus
//!
//! This crate turns a perception-supplied element id into a live locator:
//! - `DescriptorStore`: the latest perception snapshot, replaced wholesale
//! - `StrategyGenerator`: identity attribute, test id, ARIA role, text, then raw CSS
//! - `Resolver`: cardinality and visibility probing with bounded backoff retries
//! - Ambiguity tracking so multi-match locators are reported, never acted on

pub mod errors;
pub mod resolver;
pub mod store;
pub mod strategies;
pub mod types;

pub use errors::*;
pub use resolver::*;
pub use store::*;
pub use strategies::*;
pub use types::*;
