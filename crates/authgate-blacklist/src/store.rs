//! The fail-open blacklist store.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::backend::RevocationBackend;
use crate::error::{BlacklistError, Result};
use crate::BlacklistConfig;

/// A revocation list over a TTL key-value backend.
///
/// Hot-path methods absorb backend outages and fail open; see the crate
/// docs for the availability trade-off.
pub struct Blacklist {
    backend: Arc<dyn RevocationBackend>,
    config: BlacklistConfig,
}

impl Blacklist {
    /// Create a store over the given backend.
    #[must_use]
    pub fn new(backend: Arc<dyn RevocationBackend>, config: BlacklistConfig) -> Self {
        Self { backend, config }
    }

    fn key_for(&self, token: &str) -> String {
        format!("{}{}", self.config.key_prefix, token)
    }

    /// Revoke `token` for `ttl`.
    ///
    /// Returns whether the entry was written. A backend outage is logged and
    /// reported as `false`; the caller proceeds either way.
    pub async fn add(&self, token: &str, ttl: Duration) -> bool {
        if ttl.is_zero() {
            return false;
        }
        let key = self.key_for(token);
        match self.backend.set_with_ttl(&key, ttl).await {
            Ok(()) => true,
            Err(BlacklistError::Unavailable(reason)) => {
                warn!(%reason, "revocation write skipped, cache unavailable");
                false
            }
            Err(err) => {
                warn!(error = %err, "revocation write failed");
                false
            }
        }
    }

    /// Revoke `token` until `expires_at`.
    ///
    /// The TTL is clamped to the token's remaining lifetime, so an entry
    /// never outlives the token it blocks. A token that has already expired
    /// needs no entry; the call is a no-op returning `false`.
    pub async fn add_until(&self, token: &str, expires_at: DateTime<Utc>) -> bool {
        let remaining = expires_at - Utc::now();
        match remaining.to_std() {
            Ok(ttl) => self.add(token, ttl).await,
            Err(_) => false,
        }
    }

    /// Whether `token` is currently revoked.
    ///
    /// Fails open: a backend outage is logged and answered with `false`,
    /// keeping token verification available during a cache failure.
    pub async fn is_revoked(&self, token: &str) -> bool {
        let key = self.key_for(token);
        match self.backend.exists(&key).await {
            Ok(revoked) => revoked,
            Err(BlacklistError::Unavailable(reason)) => {
                warn!(%reason, "revocation check failed open, cache unavailable");
                false
            }
            Err(err) => {
                warn!(error = %err, "revocation check failed open");
                false
            }
        }
    }

    /// Remove `token` from the list.
    ///
    /// # Errors
    ///
    /// Propagates backend errors; this is maintenance tooling, not a
    /// hot-path call, so it does not fail open.
    pub async fn remove(&self, token: &str) -> Result<()> {
        self.backend.delete(&self.key_for(token)).await
    }

    /// List currently revoked tokens, with the key prefix stripped.
    ///
    /// # Errors
    ///
    /// Propagates backend errors; admin tooling wants to see an outage
    /// rather than an empty list.
    pub async fn entries(&self) -> Result<Vec<String>> {
        let keys = self
            .backend
            .keys_with_prefix(&self.config.key_prefix)
            .await?;
        Ok(keys
            .into_iter()
            .map(|k| {
                k.strip_prefix(&self.config.key_prefix)
                    .map_or_else(|| k.clone(), ToString::to_string)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::UnreachableBackend;
    use crate::memory::MemoryBackend;
    use chrono::Duration as ChronoDuration;

    fn store() -> Blacklist {
        Blacklist::new(Arc::new(MemoryBackend::new()), BlacklistConfig::default())
    }

    #[tokio::test]
    async fn add_then_revoked() {
        let blacklist = store();

        assert!(blacklist.add("tok", Duration::from_secs(60)).await);
        assert!(blacklist.is_revoked("tok").await);
        assert!(!blacklist.is_revoked("other").await);
    }

    #[tokio::test]
    async fn add_until_clamps_to_remaining_lifetime() {
        let backend = Arc::new(MemoryBackend::new());
        let blacklist = Blacklist::new(backend, BlacklistConfig::default());

        let expires_at = Utc::now() + ChronoDuration::seconds(60);
        assert!(blacklist.add_until("tok", expires_at).await);
        assert!(blacklist.is_revoked("tok").await);
    }

    #[tokio::test]
    async fn entry_dies_with_its_token() {
        let blacklist = store();

        let expires_at = Utc::now() + ChronoDuration::milliseconds(30);
        assert!(blacklist.add_until("tok", expires_at).await);
        assert!(blacklist.is_revoked("tok").await);

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(!blacklist.is_revoked("tok").await);
    }

    #[tokio::test]
    async fn add_until_expired_token_is_noop() {
        let blacklist = store();

        let expires_at = Utc::now() - ChronoDuration::seconds(10);
        assert!(!blacklist.add_until("tok", expires_at).await);
        assert!(!blacklist.is_revoked("tok").await);
    }

    #[tokio::test]
    async fn fails_open_when_backend_unreachable() {
        let blacklist = Blacklist::new(
            Arc::new(UnreachableBackend),
            BlacklistConfig::default(),
        );

        assert!(!blacklist.add("tok", Duration::from_secs(60)).await);
        assert!(!blacklist.is_revoked("tok").await);
    }

    #[tokio::test]
    async fn entries_strip_prefix() {
        let blacklist = store();
        blacklist.add("a", Duration::from_secs(60)).await;
        blacklist.add("b", Duration::from_secs(60)).await;

        let mut entries = blacklist.entries().await.unwrap();
        entries.sort();
        assert_eq!(entries, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn entries_surface_outage() {
        let blacklist = Blacklist::new(
            Arc::new(UnreachableBackend),
            BlacklistConfig::default(),
        );

        assert!(blacklist.entries().await.is_err());
    }
}
