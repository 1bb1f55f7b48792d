//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Health check
//!
//! # Auth (development accounts)
//! POST   /auth/login                - Email + password login
//! POST   /auth/logout               - Logout
//! GET    /auth/me                   - Current admin, if any
//!
//! # Products (view_products)
//! GET    /api/products              - Catalog with on-hand totals
//!
//! # Inventory (view_inventory / manage_inventory)
//! GET    /api/inventory             - POS and manual entries
//! POST   /api/inventory             - Add manual entry
//! PUT    /api/inventory/{id}        - Set quantity (pushed to POS for POS items)
//! DELETE /api/inventory/{id}        - Remove manual entry
//! GET    /api/inventory/low-stock   - At or below threshold
//! GET    /api/inventory/expiring    - Expiring within N days
//!
//! # POS (sync_pos / view_products)
//! POST   /api/pos/sync              - Pull inventory from Alleaves
//! GET    /api/pos/products          - Alleaves products
//! GET    /api/pos/products/{id}     - Alleaves product
//! ```

pub mod auth;
pub mod inventory;
pub mod pos;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me))
}

/// Create the inventory routes router.
pub fn inventory_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(inventory::index).post(inventory::create))
        .route("/low-stock", get(inventory::low_stock))
        .route("/expiring", get(inventory::expiring))
        .route("/{id}", put(inventory::update).delete(inventory::delete))
}

/// Create the POS routes router.
pub fn pos_routes() -> Router<AppState> {
    Router::new()
        .route("/sync", post(pos::sync))
        .route("/products", get(pos::products))
        .route("/products/{id}", get(pos::product))
}

/// Create all routes for the admin.
pub fn routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_routes())
        .route("/api/products", get(products::index))
        .nest("/api/inventory", inventory_routes())
        .nest("/api/pos", pos_routes())
}
