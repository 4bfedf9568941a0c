//! In-memory ledger.

use async_trait::async_trait;
use authgate_core::UserId;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::{LedgerError, Result};
use crate::ledger::{RefreshRecord, RefreshTokenLedger};

/// A ledger backed by a process-local map.
///
/// All mutation happens under a single lock, which gives
/// `validate_and_consume` its check-then-consume atomicity for free.
/// Intended for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: Mutex<HashMap<String, RefreshRecord>>,
}

impl MemoryLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records, live or revoked.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// Whether the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }
}

#[async_trait]
impl RefreshTokenLedger for MemoryLedger {
    async fn persist(&self, record: RefreshRecord) -> Result<()> {
        self.records.lock().insert(record.token.clone(), record);
        Ok(())
    }

    async fn validate_and_consume(&self, token: &str) -> Result<RefreshRecord> {
        let mut records = self.records.lock();
        let record = records.get_mut(token).ok_or(LedgerError::NotFound)?;

        if record.revoked {
            return Err(LedgerError::Reused);
        }
        if record.expires_at <= Utc::now() {
            return Err(LedgerError::Expired);
        }

        record.revoked = true;
        Ok(record.clone())
    }

    async fn revoke(&self, token: &str) -> Result<()> {
        if let Some(record) = self.records.lock().get_mut(token) {
            record.revoked = true;
        }
        Ok(())
    }

    async fn revoke_all(&self, user_id: UserId) -> Result<u64> {
        let mut count = 0;
        for record in self.records.lock().values_mut() {
            if record.user_id == user_id && !record.revoked {
                record.revoked = true;
                count += 1;
            }
        }
        Ok(count)
    }
}
