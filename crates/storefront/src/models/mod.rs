//! Domain models for storefront.

pub mod session;

pub use session::{AgeVerification, keys as session_keys};
