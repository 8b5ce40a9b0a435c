use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrivacyError {
    #[error("secret placeholder must not be empty")]
    EmptyPlaceholder,
}

pub type PrivacyResult<T> = Result<T, PrivacyError>;
