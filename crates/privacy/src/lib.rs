//! Secret handling for the engine: a placeholder → value registry that is
//! consulted only right before text reaches the page, and redaction helpers
//! that keep those values out of results and logs.

pub mod errors;
pub mod secrets;
pub mod text;
pub mod url;

pub use errors::{PrivacyError, PrivacyResult};
pub use secrets::{SecretStore, Substitution, REDACTED};
pub use text::mask_credentials;
pub use crate::url::redact_url;
