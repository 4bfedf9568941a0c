//! The revocation backend trait.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Key-value operations the blacklist needs from its cache.
///
/// Implementations must be safe for concurrent use. All calls should be
/// bounded in time; a hang is indistinguishable from an outage to the
/// caller, and the store treats timeouts as unavailability.
#[async_trait]
pub trait RevocationBackend: Send + Sync {
    /// Set `key` with the given TTL. Overwrites any existing entry.
    ///
    /// # Errors
    ///
    /// Returns `BlacklistError::Unavailable` if the cache cannot be reached.
    async fn set_with_ttl(&self, key: &str, ttl: Duration) -> Result<()>;

    /// Whether `key` currently exists.
    ///
    /// # Errors
    ///
    /// Returns `BlacklistError::Unavailable` if the cache cannot be reached.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove `key` if present.
    ///
    /// # Errors
    ///
    /// Returns `BlacklistError::Unavailable` if the cache cannot be reached.
    async fn delete(&self, key: &str) -> Result<()>;

    /// List all keys starting with `prefix`. Admin/maintenance tooling only.
    ///
    /// # Errors
    ///
    /// Returns `BlacklistError::Unavailable` if the cache cannot be reached.
    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>>;
}

/// A backend that always reports the cache as unreachable.
///
/// Used to exercise the fail-open path in tests.
#[cfg(any(test, feature = "test-utils"))]
#[derive(Debug, Default)]
pub struct UnreachableBackend;

#[cfg(any(test, feature = "test-utils"))]
#[async_trait]
impl RevocationBackend for UnreachableBackend {
    async fn set_with_ttl(&self, _key: &str, _ttl: Duration) -> Result<()> {
        Err(crate::BlacklistError::Unavailable(
            "cache is down".to_string(),
        ))
    }

    async fn exists(&self, _key: &str) -> Result<bool> {
        Err(crate::BlacklistError::Unavailable(
            "cache is down".to_string(),
        ))
    }

    async fn delete(&self, _key: &str) -> Result<()> {
        Err(crate::BlacklistError::Unavailable(
            "cache is down".to_string(),
        ))
    }

    async fn keys_with_prefix(&self, _prefix: &str) -> Result<Vec<String>> {
        Err(crate::BlacklistError::Unavailable(
            "cache is down".to_string(),
        ))
    }
}
