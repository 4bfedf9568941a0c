//! Credential lookup.

use async_trait::async_trait;
use authgate_core::Credential;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::error::Result;

/// Read access to stored user credentials, keyed by email.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up the credential for `email`, if any.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::DependencyUnavailable` if the store cannot
    /// be reached.
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>>;
}

/// A credential store backed by a process-local map.
///
/// Serves tests and small deployments; a real user database plugs in
/// through [`CredentialStore`].
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: RwLock<HashMap<String, Credential>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a credential, keyed by its email.
    pub fn insert(&self, credential: Credential) {
        self.credentials
            .write()
            .insert(credential.email.clone(), credential);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Credential>> {
        Ok(self.credentials.read().get(email).cloned())
    }
}
