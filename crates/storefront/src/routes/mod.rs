//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Health check
//!
//! # Age gate
//! GET  /api/age-gate                    - Whether the session passed the gate
//! POST /api/age-gate                    - Submit birth date (21+)
//!
//! # Products (public)
//! GET  /api/products                    - Filtered, sorted listing
//! GET  /api/products/featured           - Featured products
//! GET  /api/products/sale               - Products on sale
//! GET  /api/products/{id}               - Product detail with lab summary
//! GET  /api/products/{id}/related       - Related products
//! GET  /api/categories/{category}       - Category listing
//!
//! # Cart (age gate required)
//! GET  /api/cart                        - Cart with totals
//! POST /api/cart/add                    - Add to cart (merges matching lines)
//! POST /api/cart/update                 - Set line quantity
//! POST /api/cart/remove                 - Remove line
//! POST /api/cart/clear                  - Empty cart
//! GET  /api/cart/count                  - Cart count badge
//! PUT  /api/cart/destination            - Tax and delivery destination
//!
//! # Checkout (age gate required)
//! POST /api/checkout                    - Place order
//! GET  /api/checkout/status             - Latest checkout status
//! GET  /api/checkout/quote              - Totals for a delivery method
//! POST /api/checkout/id-upload          - Simulated ID upload
//! ```

pub mod age_gate;
pub mod cart;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::state::AppState;

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/featured", get(products::featured))
        .route("/sale", get(products::sale))
        .route("/{id}", get(products::show))
        .route("/{id}/related", get(products::related))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
        .route("/destination", put(cart::set_destination))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(checkout::place_order))
        .route("/status", get(checkout::status))
        .route("/quote", get(checkout::quote))
        .route("/id-upload", post(checkout::id_upload))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/age-gate", get(age_gate::status).post(age_gate::verify))
        .nest("/api/products", product_routes())
        .route("/api/categories/{category}", get(products::by_category))
        .nest("/api/cart", cart_routes())
        .nest("/api/checkout", checkout_routes())
}
