pub mod apply;
pub mod defaults;
pub mod errors;
pub mod loader;
pub mod model;

pub use defaults::default_snapshot;
pub use errors::PolicyError;
pub use loader::load_snapshot;
pub use model::{
    ExecutionPolicy, LocatorPolicy, PolicySnapshot, PolicySource, PolicyView, RetryPolicy,
};
