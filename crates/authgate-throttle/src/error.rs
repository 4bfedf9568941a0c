//! Throttle error types.

use thiserror::Error;

/// A result type using `ThrottleError`.
pub type Result<T> = std::result::Result<T, ThrottleError>;

/// Errors returned by throttle checks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ThrottleError {
    /// The request rate for this key is exhausted.
    #[error("rate limited, retry after {retry_after_seconds}s")]
    RateLimited {
        /// Seconds until the oldest request in the window ages out.
        retry_after_seconds: u64,
    },

    /// The key is locked out after repeated failed logins.
    #[error("account locked for another {remaining_seconds}s")]
    AccountLocked {
        /// Seconds until the lock expires.
        remaining_seconds: u64,
    },
}
