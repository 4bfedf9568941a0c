//! Ledger error types.

use thiserror::Error;

/// A result type using `LedgerError`.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors from refresh token persistence and rotation.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The token exists but was already consumed or revoked.
    ///
    /// Rotation makes every refresh token single-use, so a second
    /// presentation is treated as evidence of theft by the caller.
    #[error("refresh token already used")]
    Reused,

    /// The token exists but its server-side expiry has passed.
    #[error("refresh token expired")]
    Expired,

    /// No record of the token exists.
    #[error("refresh token not found")]
    NotFound,

    /// The backing database failed.
    #[error("ledger database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for LedgerError {
    fn from(err: sqlx::Error) -> Self {
        Self::Database(err.to_string())
    }
}
