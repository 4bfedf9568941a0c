//! Token and password error types.

use thiserror::Error;

/// A result type using `TokenError`.
pub type Result<T> = std::result::Result<T, TokenError>;

/// Errors that can occur during token verification or issuance.
///
/// These are distinct kinds, not one generic failure, because callers react
/// differently: an expired token prompts re-login, while a type mismatch is
/// token misuse and worth logging as suspicious.
#[derive(Debug, Error)]
pub enum TokenError {
    /// The token's `exp` claim has passed.
    #[error("token expired")]
    Expired,

    /// The token failed signature or structural checks.
    #[error("malformed token: {0}")]
    Malformed(String),

    /// The token's `type` claim does not match what the caller expected.
    #[error("token type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The kind the caller required.
        expected: crate::TokenKind,
        /// The kind found in the claims.
        actual: crate::TokenKind,
    },

    /// The token carries no `sub` claim.
    #[error("token missing subject")]
    MissingSubject,
}

/// Errors that can occur while hashing or verifying passwords.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The underlying bcrypt operation failed (bad hash string, bad cost).
    #[error("password hash error: {0}")]
    Hash(String),
}

impl From<bcrypt::BcryptError> for PasswordError {
    fn from(err: bcrypt::BcryptError) -> Self {
        Self::Hash(err.to_string())
    }
}
