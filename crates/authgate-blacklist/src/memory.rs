//! In-memory revocation backend.
//!
//! Entries expire lazily on read. Intended for tests and single-process
//! deployments; production uses [`crate::RedisBackend`].

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::time::Duration;

use crate::backend::RevocationBackend;
use crate::error::Result;

/// An in-memory TTL key store.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: RwLock<HashMap<String, DateTime<Utc>>>,
}

impl MemoryBackend {
    /// Create an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live (unexpired) entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Utc::now();
        self.entries.read().values().filter(|&&t| t > now).count()
    }

    /// Whether no live entries exist.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RevocationBackend for MemoryBackend {
    async fn set_with_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        let expires_at =
            Utc::now() + ChronoDuration::from_std(ttl).unwrap_or(ChronoDuration::MAX);
        self.entries.write().insert(key.to_string(), expires_at);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let now = Utc::now();
        let expired = {
            let entries = self.entries.read();
            match entries.get(key) {
                Some(&expires_at) if expires_at > now => return Ok(true),
                Some(_) => true,
                None => false,
            }
        };
        if expired {
            self.entries.write().remove(key);
        }
        Ok(false)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().remove(key);
        Ok(())
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let now = Utc::now();
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|&(k, &t)| t > now && k.starts_with(prefix))
            .map(|(k, _)| k.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_and_exists() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("k", Duration::from_secs(60))
            .await
            .unwrap();

        assert!(backend.exists("k").await.unwrap());
        assert!(!backend.exists("other").await.unwrap());
    }

    #[tokio::test]
    async fn entries_expire() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("k", Duration::from_millis(20))
            .await
            .unwrap();

        assert!(backend.exists("k").await.unwrap());
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(!backend.exists("k").await.unwrap());
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn delete_removes() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("k", Duration::from_secs(60))
            .await
            .unwrap();
        backend.delete("k").await.unwrap();

        assert!(!backend.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn prefix_listing() {
        let backend = MemoryBackend::new();
        backend
            .set_with_ttl("revoked:a", Duration::from_secs(60))
            .await
            .unwrap();
        backend
            .set_with_ttl("revoked:b", Duration::from_secs(60))
            .await
            .unwrap();
        backend
            .set_with_ttl("other:c", Duration::from_secs(60))
            .await
            .unwrap();

        let mut keys = backend.keys_with_prefix("revoked:").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["revoked:a", "revoked:b"]);
    }
}
