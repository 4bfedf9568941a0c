//! Refresh token persistence for authgate.
//!
//! Refresh tokens are long-lived, so a signature check alone is not enough
//! to trust one: the ledger records every issued token server-side and
//! marks it consumed on first use (rotation) or revoked on logout. A token
//! the ledger no longer vouches for is dead regardless of its signature.
//!
//! [`MemoryLedger`] serves tests and single-process use;
//! [`PostgresLedger`] is the production backend.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod ledger;
pub mod memory;
pub mod postgres;

pub use error::{LedgerError, Result};
pub use ledger::{RefreshRecord, RefreshTokenLedger};
pub use memory::MemoryLedger;
pub use postgres::PostgresLedger;
