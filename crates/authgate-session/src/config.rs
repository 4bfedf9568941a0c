//! Engine configuration, loadable from the environment.

use std::env;
use std::time::Duration;
use thiserror::Error;

use authgate_blacklist::BlacklistConfig;
use authgate_throttle::ThrottleConfig;
use authgate_token::{HashPolicy, TokenConfig};

/// Configuration loading errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("required environment variable {0} is not set")]
    MissingVar(&'static str),

    /// An environment variable holds an unparseable value.
    #[error("environment variable {name} is invalid: {reason}")]
    InvalidVar {
        /// The variable name.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
}

/// Complete configuration for the session engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Token issuance and verification settings.
    pub token: TokenConfig,
    /// Rate limit and lockout settings.
    pub throttle: ThrottleConfig,
    /// Revocation blacklist settings.
    pub blacklist: BlacklistConfig,
    /// Password hashing settings.
    pub hashing: HashPolicy,
}

impl EngineConfig {
    /// Build a configuration with the given signing secret and defaults
    /// everywhere else.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            token: TokenConfig::new(secret),
            throttle: ThrottleConfig::default(),
            blacklist: BlacklistConfig::default(),
            hashing: HashPolicy::default(),
        }
    }

    /// Load configuration from `AUTHGATE_*` environment variables.
    ///
    /// `AUTHGATE_TOKEN_SECRET` is required; everything else falls back to
    /// defaults.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingVar` for an absent secret and
    /// `ConfigError::InvalidVar` for unparseable values.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = env::var("AUTHGATE_TOKEN_SECRET")
            .map_err(|_| ConfigError::MissingVar("AUTHGATE_TOKEN_SECRET"))?;

        let mut token = TokenConfig::new(secret);
        if let Some(audience) = optional("AUTHGATE_TOKEN_AUDIENCE") {
            token = token.audience(audience);
        }
        if let Some(issuer) = optional("AUTHGATE_TOKEN_ISSUER") {
            token = token.issuer(issuer);
        }
        if let Some(secs) = parsed::<u64>("AUTHGATE_ACCESS_TTL_SECS")? {
            token = token.access_ttl_seconds(secs);
        }
        if let Some(secs) = parsed::<u64>("AUTHGATE_REFRESH_TTL_SECS")? {
            token = token.refresh_ttl_seconds(secs);
        }

        let mut throttle = ThrottleConfig::default();
        if let Some(limit) = parsed::<u32>("AUTHGATE_RATE_LIMIT")? {
            throttle.rate_limit = limit;
        }
        if let Some(secs) = parsed::<u64>("AUTHGATE_RATE_WINDOW_SECS")? {
            throttle.rate_window = Duration::from_secs(secs);
        }
        if let Some(threshold) = parsed::<u32>("AUTHGATE_LOCKOUT_THRESHOLD")? {
            throttle.lockout_threshold = threshold;
        }
        if let Some(secs) = parsed::<u64>("AUTHGATE_LOCKOUT_SECS")? {
            throttle.lockout_duration = Duration::from_secs(secs);
        }

        let mut blacklist = BlacklistConfig::default();
        if let Some(prefix) = optional("AUTHGATE_BLACKLIST_PREFIX") {
            blacklist.key_prefix = prefix;
        }

        let mut hashing = HashPolicy::default();
        if let Some(cost) = parsed::<u32>("AUTHGATE_BCRYPT_COST")? {
            hashing = hashing.cost(cost);
        }

        Ok(Self {
            token,
            throttle,
            blacklist,
            hashing,
        })
    }
}

fn optional(name: &'static str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(name: &'static str) -> Result<Option<T>, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e: T::Err| ConfigError::InvalidVar {
                name,
                reason: e.to_string(),
            }),
        None => Ok(None),
    }
}
