//! Business logic services for storefront.
//!
//! # Services
//!
//! - `analytics` - Fire-and-forget cart event tracking
//! - `checkout` - Checkout orchestration with in-flight guard and idempotency
//! - `orders` - Simulated order gateway

pub mod analytics;
pub mod checkout;
pub mod orders;

pub use analytics::AnalyticsTracker;
pub use checkout::{CheckoutError, CheckoutService, IdVerification, OrderConfirmation};
pub use orders::{OrderError, OrderGateway};
