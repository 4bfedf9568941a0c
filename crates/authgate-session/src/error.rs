//! The session-level error taxonomy.
//!
//! Every failure a caller can see maps to exactly one variant here, and
//! every variant maps to one HTTP status. Credential failures are
//! deliberately uniform: an unknown email and a wrong password both
//! surface as [`SessionError::InvalidCredentials`] so responses cannot be
//! used to enumerate accounts.

use thiserror::Error;

use authgate_ledger::LedgerError;
use authgate_throttle::ThrottleError;
use authgate_token::{PasswordError, TokenError};

/// A result type using `SessionError`.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors surfaced by the session lifecycle engine.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Unknown email or wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// The account is locked out after repeated failures.
    #[error("account locked, retry in {remaining_seconds}s")]
    AccountLocked {
        /// Seconds until the lock expires.
        remaining_seconds: u64,
    },

    /// Too many requests in the rate window.
    #[error("rate limited, retry in {retry_after_seconds}s")]
    RateLimited {
        /// Seconds until the oldest in-window request ages out.
        retry_after_seconds: u64,
    },

    /// The token's `exp` has passed.
    #[error("token expired")]
    TokenExpired,

    /// The token failed signature or structural checks.
    #[error("malformed token: {0}")]
    TokenMalformed(String),

    /// The token is of the wrong kind for this operation.
    #[error("wrong token type")]
    TokenTypeMismatch,

    /// The token carries no usable `sub` claim.
    #[error("token has no subject")]
    TokenMissingSubject,

    /// The token was revoked by logout.
    #[error("token revoked")]
    TokenRevoked,

    /// A refresh token was presented a second time.
    ///
    /// Treated as evidence of theft; all of the owner's refresh tokens
    /// are revoked when this is raised.
    #[error("refresh token reuse detected")]
    TokenReused,

    /// A backing store is unreachable.
    #[error("dependency unavailable: {0}")]
    DependencyUnavailable(String),

    /// An unexpected internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SessionError {
    /// The HTTP status code this error maps to.
    #[must_use]
    pub const fn http_status_code(&self) -> u16 {
        match self {
            Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenMalformed(_)
            | Self::TokenTypeMismatch
            | Self::TokenMissingSubject
            | Self::TokenRevoked
            | Self::TokenReused => 401,
            Self::AccountLocked { .. } => 423,
            Self::RateLimited { .. } => 429,
            Self::DependencyUnavailable(_) => 503,
            Self::Internal(_) => 500,
        }
    }
}

impl From<TokenError> for SessionError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Malformed(reason) => Self::TokenMalformed(reason),
            TokenError::TypeMismatch { .. } => Self::TokenTypeMismatch,
            TokenError::MissingSubject => Self::TokenMissingSubject,
        }
    }
}

impl From<ThrottleError> for SessionError {
    fn from(err: ThrottleError) -> Self {
        match err {
            ThrottleError::RateLimited {
                retry_after_seconds,
            } => Self::RateLimited {
                retry_after_seconds,
            },
            ThrottleError::AccountLocked { remaining_seconds } => {
                Self::AccountLocked { remaining_seconds }
            }
        }
    }
}

impl From<LedgerError> for SessionError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::Reused => Self::TokenReused,
            LedgerError::Expired => Self::TokenExpired,
            // A token the ledger has no record of is dead however it was
            // lost; revoked is the honest answer.
            LedgerError::NotFound => Self::TokenRevoked,
            LedgerError::Database(reason) => Self::DependencyUnavailable(reason),
        }
    }
}

impl From<PasswordError> for SessionError {
    fn from(err: PasswordError) -> Self {
        Self::Internal(err.to_string())
    }
}
