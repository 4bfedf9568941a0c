//! Password hashing and verification using bcrypt.
//!
//! bcrypt silently ignores input past its 72-byte ceiling, which would let
//! two long passwords sharing a 72-byte prefix collide. Inputs over the
//! ceiling are therefore pre-hashed to a SHA-256 hex digest (64 bytes) and
//! the digest is fed to bcrypt instead. The same reduction runs at both
//! hash time and verify time; the two must never diverge or passwords near
//! the boundary stop verifying.

use sha2::{Digest, Sha256};
use std::borrow::Cow;

use crate::error::PasswordError;

/// bcrypt's input length ceiling in bytes.
const BCRYPT_MAX_BYTES: usize = 72;

/// Password hashing configuration.
#[derive(Debug, Clone)]
pub struct HashPolicy {
    /// bcrypt work factor.
    pub cost: u32,
}

impl Default for HashPolicy {
    fn default() -> Self {
        Self {
            cost: bcrypt::DEFAULT_COST,
        }
    }
}

impl HashPolicy {
    /// Create a policy with the default cost (12).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the bcrypt work factor.
    #[must_use]
    pub const fn cost(mut self, cost: u32) -> Self {
        self.cost = cost;
        self
    }
}

/// Verifies a plaintext password against a stored hash.
///
/// Split out as a trait so the session layer can substitute a counting spy
/// in tests; lockout must fail fast *without* spending a bcrypt cycle, and
/// that is only observable through a call counter.
pub trait PasswordVerifier: Send + Sync {
    /// Check `password` against the stored `hash`.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash cannot be parsed.
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Password hasher using bcrypt with SHA-256 pre-hashing for long inputs.
pub struct PasswordHasherService {
    policy: HashPolicy,
}

impl PasswordHasherService {
    /// Create a hasher with the given policy.
    #[must_use]
    pub const fn new(policy: HashPolicy) -> Self {
        Self { policy }
    }

    /// Create a hasher with the default policy.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(HashPolicy::default())
    }

    /// Hash a password.
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt rejects the cost factor.
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let reduced = reduce(password);
        Ok(bcrypt::hash(reduced.as_ref(), self.policy.cost)?)
    }
}

impl Default for PasswordHasherService {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl PasswordVerifier for PasswordHasherService {
    fn verify(&self, password: &str, hash: &str) -> Result<bool, PasswordError> {
        let reduced = reduce(password);
        Ok(bcrypt::verify(reduced.as_ref(), hash)?)
    }
}

/// Reduce a password to at most [`BCRYPT_MAX_BYTES`] without dropping entropy.
///
/// Inputs at or under the ceiling pass through untouched; longer inputs
/// become their SHA-256 hex digest (64 ASCII bytes).
fn reduce(password: &str) -> Cow<'_, str> {
    if password.len() <= BCRYPT_MAX_BYTES {
        Cow::Borrowed(password)
    } else {
        let digest = Sha256::digest(password.as_bytes());
        Cow::Owned(hex::encode(digest))
    }
}
