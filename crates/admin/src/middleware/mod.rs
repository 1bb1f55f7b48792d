//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions with in-memory store)
//!
//! Authentication is an extractor ([`RequireAdminAuth`]); permissions are
//! checked per handler with [`require_permission`].

pub mod auth;
pub mod session;

pub use auth::{
    RequireAdminAuth, clear_current_admin, require_permission, set_current_admin,
};
pub use session::create_session_layer;
