//! JWT issuance/verification and password hashing for authgate.
//!
//! This crate provides the two pure-CPU credential primitives of the
//! session engine:
//!
//! - [`TokenCodec`]: stateless HS256 JWT issuance and verification for the
//!   two token kinds (access, refresh)
//! - [`PasswordHasherService`]: bcrypt hashing with a SHA-256 pre-hash for
//!   passwords over bcrypt's 72-byte input ceiling
//!
//! Neither component holds mutable state; both are cheap to share across
//! request handlers.
//!
//! # Example
//!
//! ```
//! use authgate_core::{Role, UserId};
//! use authgate_token::{TokenCodec, TokenConfig, TokenKind, TokenSubject};
//!
//! let codec = TokenCodec::new(TokenConfig::new("a-shared-secret"));
//! let subject = TokenSubject {
//!     user_id: UserId::generate(),
//!     email: "a@b.com".to_string(),
//!     role: Role::User,
//! };
//!
//! let issued = codec.issue_access(&subject).unwrap();
//! let claims = codec.verify(&issued.token, TokenKind::Access).unwrap();
//! assert_eq!(claims.email, "a@b.com");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod codec;
pub mod error;
pub mod password;

pub use codec::{Claims, IssuedToken, TokenCodec, TokenKind, TokenSubject};
pub use error::{PasswordError, TokenError};
pub use password::{HashPolicy, PasswordHasherService, PasswordVerifier};

/// Configuration for token issuance and verification.
///
/// Rotating `secret` invalidates every outstanding token; that is an
/// operational consequence, not something the codec compensates for.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    /// The shared HMAC-SHA256 signing secret.
    pub secret: String,
    /// Access token lifetime in seconds.
    pub access_ttl_seconds: u64,
    /// Refresh token lifetime in seconds.
    pub refresh_ttl_seconds: u64,
    /// Fixed `aud` claim for all issued tokens.
    pub audience: String,
    /// Fixed `iss` claim for all issued tokens.
    pub issuer: String,
}

impl TokenConfig {
    /// Default access token lifetime: one hour.
    pub const DEFAULT_ACCESS_TTL_SECONDS: u64 = 3600;
    /// Default refresh token lifetime: seven days.
    pub const DEFAULT_REFRESH_TTL_SECONDS: u64 = 7 * 24 * 3600;

    /// Create a configuration with the given secret and default lifetimes.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_ttl_seconds: Self::DEFAULT_ACCESS_TTL_SECONDS,
            refresh_ttl_seconds: Self::DEFAULT_REFRESH_TTL_SECONDS,
            audience: "authgate".to_string(),
            issuer: "authgate".to_string(),
        }
    }

    /// Set the access token lifetime in seconds.
    #[must_use]
    pub fn access_ttl_seconds(mut self, seconds: u64) -> Self {
        self.access_ttl_seconds = seconds;
        self
    }

    /// Set the refresh token lifetime in seconds.
    #[must_use]
    pub fn refresh_ttl_seconds(mut self, seconds: u64) -> Self {
        self.refresh_ttl_seconds = seconds;
        self
    }

    /// Set the `aud` claim value.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = audience.into();
        self
    }

    /// Set the `iss` claim value.
    #[must_use]
    pub fn issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }
}
