//! The refresh token ledger trait and its record type.

use async_trait::async_trait;
use authgate_core::UserId;
use chrono::{DateTime, Utc};

use crate::error::Result;

/// A stored refresh token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRecord {
    /// The full signed token string.
    pub token: String,
    /// Owner of the token.
    pub user_id: UserId,
    /// When the token was issued.
    pub issued_at: DateTime<Utc>,
    /// Server-side expiry, independent of the claim inside the token.
    pub expires_at: DateTime<Utc>,
    /// Whether the token was consumed by rotation or revoked by logout.
    pub revoked: bool,
}

impl RefreshRecord {
    /// Build an unrevoked record.
    #[must_use]
    pub fn new(
        token: impl Into<String>,
        user_id: UserId,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            token: token.into(),
            user_id,
            issued_at,
            expires_at,
            revoked: false,
        }
    }
}

/// Server-side persistence for refresh tokens.
///
/// The ledger makes refresh tokens revocable and single-use: a signed
/// token is worthless unless the ledger still holds a live record for it.
#[async_trait]
pub trait RefreshTokenLedger: Send + Sync {
    /// Store a newly issued token.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Database` if the record cannot be written.
    async fn persist(&self, record: RefreshRecord) -> Result<()>;

    /// Atomically validate `token` and mark it consumed.
    ///
    /// Exactly one caller can win for a given token; concurrent
    /// presentations of the same token see `LedgerError::Reused`.
    ///
    /// # Errors
    ///
    /// `Reused` if the token was already consumed, `Expired` if its
    /// server-side expiry has passed, `NotFound` if no record exists, and
    /// `Database` for storage failures.
    async fn validate_and_consume(&self, token: &str) -> Result<RefreshRecord>;

    /// Mark `token` revoked if a live record exists. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Database` on storage failure.
    async fn revoke(&self, token: &str) -> Result<()>;

    /// Revoke every live token belonging to `user_id`.
    ///
    /// Returns the number of tokens revoked.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Database` on storage failure.
    async fn revoke_all(&self, user_id: UserId) -> Result<u64>;
}
