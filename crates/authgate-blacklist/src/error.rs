//! Blacklist error types.

use thiserror::Error;

/// A result type using `BlacklistError`.
pub type Result<T> = std::result::Result<T, BlacklistError>;

/// Errors from the revocation backend.
#[derive(Debug, Error)]
pub enum BlacklistError {
    /// The cache is unreachable or a call timed out.
    ///
    /// Hot-path callers absorb this and fail open; it never propagates to
    /// the request layer.
    #[error("revocation cache unavailable: {0}")]
    Unavailable(String),

    /// The backend configuration is invalid.
    #[error("revocation cache configuration error: {0}")]
    Configuration(String),

    /// Any other backend failure.
    #[error("revocation cache error: {0}")]
    Internal(String),
}

impl From<fred::error::Error> for BlacklistError {
    fn from(err: fred::error::Error) -> Self {
        match err.kind() {
            fred::error::ErrorKind::IO | fred::error::ErrorKind::Timeout => {
                Self::Unavailable(err.to_string())
            }
            fred::error::ErrorKind::Config => Self::Configuration(err.to_string()),
            _ => Self::Internal(err.to_string()),
        }
    }
}
