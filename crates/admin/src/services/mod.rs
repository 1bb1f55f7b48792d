//! Business logic services for admin.
//!
//! # Services
//!
//! - `auth` - Development account directory with argon2 password checks
//! - `inventory` - Shared inventory ledger with JSON persistence

pub mod auth;
pub mod inventory;

pub use auth::{AdminDirectory, AuthError, AuthSession};
pub use inventory::{InventoryStore, StoreError};
