//! Session-related types.
//!
//! Everything the storefront remembers about a visitor lives in the session:
//! the age-gate pass, the cart, the ID verification flag and the last order.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored proof that the visitor passed the age gate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeVerification {
    pub birth_date: NaiveDate,
    pub verified_at: DateTime<Utc>,
}

/// Session keys for storefront state.
pub mod keys {
    /// Key for the age-gate pass.
    pub const AGE_VERIFIED: &str = "age_verified";

    /// Key for the visitor's cart.
    pub const CART: &str = "cart";

    /// Key for the simulated ID verification flag.
    pub const ID_VERIFIED: &str = "id_verified";

    /// Key for the latest checkout status.
    pub const CHECKOUT_STATUS: &str = "checkout_status";

    /// Key for checkout bookkeeping before the session has an ID.
    pub const CHECKOUT_KEY: &str = "checkout_key";

    /// Key for the most recent order confirmation.
    pub const LAST_ORDER: &str = "last_order";
}
