//! Action primitives - the capability surface the engine drives
//!
//! This crate provides the building blocks the locator and executor share:
//! - `PagePort`: the opaque browser adapter (probe, click, fill, navigate, settle)
//! - `LocatorSpec`: a lazy description of how to find one element
//! - `Clock` and `ExecCtx`: the single command deadline and injectable time
//! - Best-effort settle waiting after actions

pub mod clock;
pub mod errors;
pub mod page;
pub mod types;
mod waiting;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use clock::*;
pub use errors::*;
pub use page::*;
pub use types::*;
pub use waiting::*;
