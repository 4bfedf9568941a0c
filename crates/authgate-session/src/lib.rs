//! Session lifecycle orchestration for authgate.
//!
//! [`SessionManager`] is the engine's front door. It wires the stateless
//! token codec, the password verifier, the attempt throttle, the revocation
//! blacklist, and the refresh token ledger into four operations:
//!
//! - [`SessionManager::authenticate`]: email/password login issuing an
//!   access/refresh pair
//! - [`SessionManager::authorize_request`]: access token verification for
//!   protected requests
//! - [`SessionManager::refresh`]: single-use refresh rotation with reuse
//!   detection
//! - [`SessionManager::logout`] / [`SessionManager::logout_all`]: token
//!   revocation
//!
//! Every collaborator sits behind an `Arc`, and the stateful ones behind
//! traits, so deployments choose their backends (and tests their fakes)
//! without touching the flows.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod manager;
pub mod store;

pub use config::{ConfigError, EngineConfig};
pub use error::{Result, SessionError};
pub use manager::{AuthenticatedSession, SessionManager, TokenPair};
pub use store::{CredentialStore, MemoryCredentialStore};
