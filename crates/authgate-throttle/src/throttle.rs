//! The consolidated attempt throttle.
//!
//! Two windowed counters share the [`crate::WindowMap`] algorithm but are
//! keyed differently and never mix: request rate limiting keys on the
//! caller identifier alone, lockout keys on `identifier:ip` and counts only
//! failed password verifications.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::error::{Result, ThrottleError};
use crate::window::WindowMap;
use crate::ThrottleConfig;

/// Sliding-window request throttle and failed-login lockout tracker.
///
/// Construct one instance at process start and share it by reference; all
/// methods take `&self` and are safe under concurrent access.
#[derive(Debug, Default)]
pub struct AttemptThrottle {
    config: ThrottleConfig,
    requests: WindowMap,
    failures: WindowMap,
    locks: Mutex<HashMap<String, DateTime<Utc>>>,
}

impl AttemptThrottle {
    /// Create a throttle with the given configuration.
    #[must_use]
    pub fn new(config: ThrottleConfig) -> Self {
        Self {
            config,
            requests: WindowMap::new(),
            failures: WindowMap::new(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// The throttle configuration.
    #[must_use]
    pub const fn config(&self) -> &ThrottleConfig {
        &self.config
    }

    /// Record a request for `key` and reject it if the rate window is full.
    ///
    /// Applied to every auth-endpoint call (login, refresh, logout).
    ///
    /// # Errors
    ///
    /// Returns `ThrottleError::RateLimited` with the seconds until the
    /// oldest in-window request ages out.
    pub fn check_request(&self, key: &str) -> Result<()> {
        self.check_request_at(key, Utc::now())
    }

    /// [`Self::check_request`] with an explicit clock, for tests.
    ///
    /// # Errors
    ///
    /// See [`Self::check_request`].
    pub fn check_request_at(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        match self.requests.record_below_at(
            key,
            self.config.rate_window,
            self.config.rate_limit,
            now,
        ) {
            Ok(_) => Ok(()),
            Err(counted) => {
                let oldest = counted.oldest.unwrap_or(now);
                let window = ChronoDuration::from_std(self.config.rate_window)
                    .unwrap_or(ChronoDuration::MAX);
                let retry_after = (window - (now - oldest)).num_seconds().max(0);
                Err(ThrottleError::RateLimited {
                    retry_after_seconds: u64::try_from(retry_after).unwrap_or(0),
                })
            }
        }
    }

    /// Fail fast if `key` is locked out, without touching any counters.
    ///
    /// Expired locks are cleared lazily here.
    ///
    /// # Errors
    ///
    /// Returns `ThrottleError::AccountLocked` with the remaining seconds.
    pub fn check_locked(&self, key: &str) -> Result<()> {
        self.check_locked_at(key, Utc::now())
    }

    /// [`Self::check_locked`] with an explicit clock, for tests.
    ///
    /// # Errors
    ///
    /// See [`Self::check_locked`].
    pub fn check_locked_at(&self, key: &str, now: DateTime<Utc>) -> Result<()> {
        let mut locks = self.locks.lock();
        match locks.get(key) {
            Some(&locked_until) if locked_until > now => {
                let remaining = (locked_until - now).num_seconds().max(0);
                Err(ThrottleError::AccountLocked {
                    remaining_seconds: u64::try_from(remaining).unwrap_or(0),
                })
            }
            Some(_) => {
                locks.remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Record a failed password verification for `key`.
    ///
    /// Returns `Some(locked_until)` when this failure reaches the lockout
    /// threshold and sets a lock; the failure window is reset so the next
    /// lock requires a fresh run of failures.
    pub fn record_failure(&self, key: &str) -> Option<DateTime<Utc>> {
        self.record_failure_at(key, Utc::now())
    }

    /// [`Self::record_failure`] with an explicit clock, for tests.
    pub fn record_failure_at(&self, key: &str, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        let counted = self
            .failures
            .record_at(key, self.config.lockout_duration, now);

        if counted.count >= self.config.lockout_threshold {
            let locked_until = now
                + ChronoDuration::from_std(self.config.lockout_duration)
                    .unwrap_or(ChronoDuration::MAX);
            self.locks.lock().insert(key.to_string(), locked_until);
            self.failures.clear(key);
            tracing::warn!(key = %key, locked_until = %locked_until, "lockout threshold reached");
            Some(locked_until)
        } else {
            None
        }
    }

    /// Clear the failure counter for `key` after a successful login.
    ///
    /// An already-set lock is *not* released early.
    pub fn clear_failures(&self, key: &str) {
        self.failures.clear(key);
    }
}
