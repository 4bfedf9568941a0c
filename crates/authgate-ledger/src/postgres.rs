//! Postgres-backed ledger.
//!
//! `validate_and_consume` is a single conditional `UPDATE ... RETURNING`,
//! so the check and the consume are one statement and concurrent
//! presentations of the same token race on a row lock: exactly one wins.

use async_trait::async_trait;
use authgate_core::UserId;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use crate::error::{LedgerError, Result};
use crate::ledger::{RefreshRecord, RefreshTokenLedger};

/// A ledger stored in a `refresh_tokens` table.
#[derive(Debug, Clone)]
pub struct PostgresLedger {
    pool: PgPool,
}

impl PostgresLedger {
    /// Wrap an existing connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `refresh_tokens` table and its indexes if missing.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Database` on failure.
    pub async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS refresh_tokens (
                token      TEXT PRIMARY KEY,
                user_id    UUID NOT NULL,
                issued_at  TIMESTAMPTZ NOT NULL,
                expires_at TIMESTAMPTZ NOT NULL,
                revoked    BOOLEAN NOT NULL DEFAULT FALSE
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS refresh_tokens_user_id_idx
             ON refresh_tokens (user_id) WHERE NOT revoked",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    fn record_from_row(row: &PgRow) -> std::result::Result<RefreshRecord, sqlx::Error> {
        let user_id: Uuid = row.try_get("user_id")?;
        Ok(RefreshRecord {
            token: row.try_get("token")?,
            user_id: UserId::from_uuid(user_id),
            issued_at: row.try_get("issued_at")?,
            expires_at: row.try_get("expires_at")?,
            revoked: row.try_get("revoked")?,
        })
    }
}

#[async_trait]
impl RefreshTokenLedger for PostgresLedger {
    async fn persist(&self, record: RefreshRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO refresh_tokens (token, user_id, issued_at, expires_at, revoked)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&record.token)
        .bind(record.user_id.as_uuid())
        .bind(record.issued_at)
        .bind(record.expires_at)
        .bind(record.revoked)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn validate_and_consume(&self, token: &str) -> Result<RefreshRecord> {
        let consumed = sqlx::query(
            "UPDATE refresh_tokens
             SET revoked = TRUE
             WHERE token = $1 AND revoked = FALSE AND expires_at > NOW()
             RETURNING token, user_id, issued_at, expires_at, revoked",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(row) = consumed {
            return Ok(Self::record_from_row(&row)?);
        }

        // The conditional update matched nothing. Look at the row (if any)
        // to tell the caller which condition failed.
        let existing = sqlx::query(
            "SELECT revoked, expires_at FROM refresh_tokens WHERE token = $1",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            Some(row) => {
                let revoked: bool = row.try_get("revoked").map_err(LedgerError::from)?;
                if revoked {
                    Err(LedgerError::Reused)
                } else {
                    Err(LedgerError::Expired)
                }
            }
            None => Err(LedgerError::NotFound),
        }
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE token = $1")
            .bind(token)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked = TRUE
             WHERE user_id = $1 AND revoked = FALSE",
        )
        .bind(user_id.as_uuid())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }
}
