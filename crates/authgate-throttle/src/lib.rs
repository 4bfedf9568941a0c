//! Sliding-window rate limiting and login lockout for authgate.
//!
//! One windowed-counting algorithm ([`window::WindowMap`]) backs two
//! independent counters with different key spaces:
//!
//! - a request rate limiter keyed by caller identifier, applied to every
//!   auth-endpoint call
//! - a failed-login lockout tracker keyed by `identifier:ip`, counting only
//!   failed password verifications
//!
//! Both live in [`AttemptThrottle`], constructed once at process start and
//! shared by reference across request handlers. State is process-local and
//! rebuilt from zero on restart; the worst case is a brief extra allowance.
//!
//! # Example
//!
//! ```
//! use authgate_throttle::{AttemptThrottle, ThrottleConfig};
//!
//! let throttle = AttemptThrottle::new(ThrottleConfig::default());
//! assert!(throttle.check_request("a@b.com").is_ok());
//! assert!(throttle.check_locked("a@b.com:10.0.0.1").is_ok());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod throttle;
pub mod window;

pub use error::ThrottleError;
pub use throttle::AttemptThrottle;
pub use window::WindowMap;

use std::time::Duration;

/// Configuration for the request rate limiter and the lockout tracker.
#[derive(Debug, Clone)]
pub struct ThrottleConfig {
    /// Requests allowed per key within `rate_window`.
    pub rate_limit: u32,
    /// Length of the request-rate window.
    pub rate_window: Duration,
    /// Failed password verifications that trigger a lock.
    pub lockout_threshold: u32,
    /// Both the failure-counting window and the lock duration.
    pub lockout_duration: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            rate_limit: 10,
            rate_window: Duration::from_secs(60),
            lockout_threshold: 5,
            lockout_duration: Duration::from_secs(900),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ThrottleConfig::default();
        assert_eq!(config.rate_limit, 10);
        assert_eq!(config.rate_window, Duration::from_secs(60));
        assert_eq!(config.lockout_threshold, 5);
        assert_eq!(config.lockout_duration, Duration::from_secs(900));
    }
}
