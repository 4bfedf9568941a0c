//! Redis revocation backend.
//!
//! Every command is wrapped in a bounded timeout; an elapsed timeout is
//! reported as `Unavailable` so the store's fail-open policy can take over.
//! The client reconnects with exponential backoff on its own; the engine
//! never retries individual commands.

use async_trait::async_trait;
use fred::prelude::*;
use fred::types::scan::Scanner;
use futures::TryStreamExt;
use std::future::Future;
use std::time::Duration;

use crate::backend::RevocationBackend;
use crate::error::{BlacklistError, Result};

/// Redis connection configuration.
#[derive(Debug, Clone)]
pub struct RedisConfig {
    /// Redis server host.
    pub host: String,
    /// Redis server port.
    pub port: u16,
    /// Redis password (optional).
    pub password: Option<String>,
    /// Redis database number.
    pub database: u8,
    /// Upper bound on any single command.
    pub command_timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            database: 0,
            command_timeout: Duration::from_secs(2),
        }
    }
}

impl RedisConfig {
    /// Build the connection URL for this configuration.
    #[must_use]
    pub fn connection_url(&self) -> String {
        let auth = self
            .password
            .as_ref()
            .map(|p| format!(":{p}@"))
            .unwrap_or_default();
        format!(
            "redis://{auth}{}:{}/{}",
            self.host, self.port, self.database
        )
    }
}

/// Redis-backed revocation store.
pub struct RedisBackend {
    client: Client,
    timeout: Duration,
}

impl RedisBackend {
    /// Connect to Redis with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `BlacklistError::Configuration` for a bad URL and
    /// `BlacklistError::Unavailable` if the initial connection fails.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let redis_config = Config::from_url(&config.connection_url())
            .map_err(|e| BlacklistError::Configuration(e.to_string()))?;

        let client = Client::new(
            redis_config,
            None,
            None,
            Some(ReconnectPolicy::new_exponential(0, 1000, 30_000, 2)),
        );

        client.init().await?;

        Ok(Self {
            client,
            timeout: config.command_timeout,
        })
    }

    /// Bound a backend call; an elapsed timeout becomes `Unavailable`.
    async fn bounded<T, F>(&self, fut: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, fred::error::Error>> + Send,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result.map_err(BlacklistError::from),
            Err(_) => Err(BlacklistError::Unavailable(format!(
                "command timed out after {:?}",
                self.timeout
            ))),
        }
    }

    /// Collect keys matching a scan pattern.
    async fn scan_keys(
        &self,
        pattern: &str,
    ) -> std::result::Result<Vec<String>, fred::error::Error> {
        let mut scanner = self.client.scan(pattern, None, None);
        let mut keys = Vec::new();

        while let Some(result) = scanner.try_next().await? {
            if let Some(page) = result.results() {
                for value in page {
                    if let Some(s) = value.as_str() {
                        keys.push(s.to_string());
                    }
                }
            }
        }

        Ok(keys)
    }
}

#[async_trait]
impl RevocationBackend for RedisBackend {
    async fn set_with_ttl(&self, key: &str, ttl: Duration) -> Result<()> {
        let seconds = i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX);
        self.bounded(self.client.set::<(), _, _>(
            key,
            "1",
            Some(Expiration::EX(seconds)),
            None,
            false,
        ))
        .await
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let count: i64 = self.bounded(self.client.exists(key)).await?;
        Ok(count > 0)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.bounded(self.client.del::<(), _>(key)).await
    }

    async fn keys_with_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{prefix}*");
        self.bounded(self.scan_keys(&pattern)).await
    }
}
