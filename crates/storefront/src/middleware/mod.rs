//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with `request_id` field)
//! 3. Request ID (record ID on the span, echo in response)
//! 4. Session layer (tower-sessions with in-memory store)
//!
//! The age gate is an extractor rather than a layer so public catalog routes
//! stay open.

pub mod age_gate;
pub mod request_id;
pub mod session;

pub use age_gate::{RequireAgeVerified, set_age_verified};
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
