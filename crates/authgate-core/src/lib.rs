//! Core types for the authgate session engine.
//!
//! This crate provides the foundational types shared by the token, throttle,
//! ledger, and session crates:
//!
//! - **Identifiers**: the strongly-typed [`UserId`]
//! - **Domain types**: [`Role`] and [`Credential`]
//!
//! # Example
//!
//! ```
//! use authgate_core::{Credential, Role, UserId};
//!
//! let user_id = UserId::generate();
//! let credential = Credential {
//!     user_id,
//!     email: "a@b.com".to_string(),
//!     role: Role::User,
//!     password_hash: "$2b$12$...".to_string(),
//! };
//! assert_eq!(credential.role, Role::User);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ids;
pub mod role;

pub use ids::{IdError, UserId};
pub use role::{Role, UnknownRole};

use serde::{Deserialize, Serialize};

/// A stored credential looked up from the external user store.
///
/// The engine never creates or mutates these; the user store owns them.
/// Only the fields needed for token issuance and password verification
/// are carried.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    /// The owning user's identifier.
    pub user_id: UserId,
    /// The login identifier (email address).
    pub email: String,
    /// The role embedded into issued tokens.
    pub role: Role,
    /// The bcrypt hash of the user's password.
    pub password_hash: String,
}
