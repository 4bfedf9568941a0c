//! Token revocation blacklist for authgate.
//!
//! Logout writes revoked tokens here with a TTL bounded by the token's own
//! remaining lifetime, so an entry never outlives the token it blocks and
//! the store needs no manual cleanup.
//!
//! The hot-path operations ([`Blacklist::add`], [`Blacklist::add_until`],
//! [`Blacklist::is_revoked`]) **fail open**: when the backing cache is
//! unreachable or times out, `is_revoked` answers `false` and `add` answers
//! `false` without surfacing an error. API availability is prioritized over
//! instantaneous revocation; the degraded mode is logged at warning level.
//!
//! # Example
//!
//! ```
//! use authgate_blacklist::{Blacklist, BlacklistConfig, MemoryBackend};
//! use std::sync::Arc;
//!
//! # async fn example() {
//! let blacklist = Blacklist::new(Arc::new(MemoryBackend::new()), BlacklistConfig::default());
//!
//! blacklist.add("some.jwt.token", std::time::Duration::from_secs(60)).await;
//! assert!(blacklist.is_revoked("some.jwt.token").await);
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod backend;
pub mod error;
pub mod memory;
pub mod redis;
pub mod store;

pub use backend::RevocationBackend;
pub use error::{BlacklistError, Result};
pub use memory::MemoryBackend;
pub use redis::{RedisBackend, RedisConfig};
pub use store::Blacklist;

#[cfg(any(test, feature = "test-utils"))]
pub use backend::UnreachableBackend;

/// Configuration for the blacklist store.
#[derive(Debug, Clone)]
pub struct BlacklistConfig {
    /// Prefix prepended to every cache key.
    pub key_prefix: String,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            key_prefix: "revoked:".to_string(),
        }
    }
}
