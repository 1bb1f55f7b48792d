//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Every handler loads it, applies
//! one mutation, writes it back and returns the recomputed cart. Mutations
//! are reported to analytics after the session write succeeds.

use axum::{
    Json,
    extract::State,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::cart::{AddItemOptions, Cart, CartEvent, CartItem};
use jfk_cannabis_core::pricing::{Destination, PriceSummary};

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAgeVerified;
use crate::models::session_keys;
use crate::state::AppState;

/// Farthest delivery distance accepted, in miles.
const MAX_DELIVERY_MILES: f64 = 100.0;

/// One cart line as shown to the client.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub line_id: String,
    pub product_id: ProductId,
    pub name: String,
    pub brand: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub selected_weight: Option<String>,
    pub selected_size: Option<String>,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl From<&CartItem> for CartLineView {
    fn from(item: &CartItem) -> Self {
        Self {
            line_id: item.line_id.clone(),
            product_id: item.product.id,
            name: item.product.name.clone(),
            brand: item.product.brand.clone(),
            image: item.product.images.first().cloned(),
            quantity: item.cart_quantity,
            selected_weight: item.selected_weight.clone(),
            selected_size: item.selected_size.clone(),
            unit_price: item.unit_price(),
            line_total: item.line_total(),
        }
    }
}

/// Cart response with derived totals.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub destination: Destination,
    #[serde(flatten)]
    pub summary: PriceSummary,
    pub is_empty: bool,
    pub checkout_available: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartLineView::from).collect(),
            item_count: cart.item_count(),
            destination: cart.destination().clone(),
            summary: cart.summary(false),
            is_empty: cart.is_empty(),
            checkout_available: !cart.is_empty(),
        }
    }
}

/// Add to cart request.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub product_id: ProductId,
    #[serde(flatten)]
    pub options: AddItemOptions,
}

/// Update quantity request.
#[derive(Debug, Deserialize)]
pub struct UpdateCartRequest {
    pub line_id: String,
    pub quantity: i64,
}

/// Remove line request.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartRequest {
    pub line_id: String,
}

/// Cart count badge.
#[derive(Debug, Serialize)]
pub struct CartCount {
    pub count: u32,
}

// =============================================================================
// Session Helpers
// =============================================================================

/// Load the cart from the session, empty if none.
async fn load_cart(session: &Session) -> Result<Cart> {
    Ok(session
        .get::<Cart>(session_keys::CART)
        .await?
        .unwrap_or_default())
}

/// Write the cart back and report the mutation.
async fn save_cart(
    state: &AppState,
    session: &Session,
    cart: &Cart,
    event: CartEvent,
) -> Result<Json<CartView>> {
    session.insert(session_keys::CART, cart).await?;
    add_breadcrumb("cart", event.name(), &[("items", cart.item_count().to_string())]);
    state
        .analytics()
        .track(event, session.id().map(|id| id.to_string()));
    Ok(Json(CartView::from(cart)))
}

// =============================================================================
// Handlers
// =============================================================================

/// Current cart.
#[instrument(skip(session, _age))]
pub async fn show(_age: RequireAgeVerified, session: Session) -> Result<Json<CartView>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartView::from(&cart)))
}

/// Add a product to the cart.
#[instrument(skip(state, session, _age))]
pub async fn add(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
    Json(request): Json<AddToCartRequest>,
) -> Result<Json<CartView>> {
    let product = state
        .catalog()
        .get(request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("product {}", request.product_id)))?;

    let mut cart = load_cart(&session).await?;
    let event = cart.add_item(product, request.options)?;
    save_cart(&state, &session, &cart, event).await
}

/// Set a line's quantity (clamped to at least one).
#[instrument(skip(state, session, _age))]
pub async fn update(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
    Json(request): Json<UpdateCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let event = cart.update_quantity(&request.line_id, request.quantity)?;
    save_cart(&state, &session, &cart, event).await
}

/// Remove a line.
#[instrument(skip(state, session, _age))]
pub async fn remove(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
    Json(request): Json<RemoveFromCartRequest>,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let event = cart.remove_item(&request.line_id)?;
    save_cart(&state, &session, &cart, event).await
}

/// Empty the cart.
#[instrument(skip(state, session, _age))]
pub async fn clear(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
) -> Result<Json<CartView>> {
    let mut cart = load_cart(&session).await?;
    let event = cart.clear();
    save_cart(&state, &session, &cart, event).await
}

/// Cart count badge.
#[instrument(skip(session, _age))]
pub async fn count(_age: RequireAgeVerified, session: Session) -> Result<Json<CartCount>> {
    let cart = load_cart(&session).await?;
    Ok(Json(CartCount {
        count: cart.item_count(),
    }))
}

/// Change where the cart is priced for.
#[instrument(skip(session, _age))]
pub async fn set_destination(
    _age: RequireAgeVerified,
    session: Session,
    Json(destination): Json<Destination>,
) -> Result<Json<CartView>> {
    let destination = validate_destination(destination)?;
    let mut cart = load_cart(&session).await?;
    cart.set_destination(destination);
    session.insert(session_keys::CART, &cart).await?;
    Ok(Json(CartView::from(&cart)))
}

fn validate_destination(destination: Destination) -> Result<Destination> {
    let state = destination.state.trim().to_ascii_uppercase();
    if state.len() != 2 || !state.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(AppError::BadRequest(
            "state must be a two-letter code".to_string(),
        ));
    }
    let miles = destination.distance_miles;
    if !miles.is_finite() || !(0.0..=MAX_DELIVERY_MILES).contains(&miles) {
        return Err(AppError::BadRequest(format!(
            "distance_miles must be between 0 and {MAX_DELIVERY_MILES}"
        )));
    }
    Ok(Destination {
        state,
        distance_miles: miles,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_destination_normalizes_state() {
        let destination = validate_destination(Destination {
            state: " nj ".to_string(),
            distance_miles: 7.5,
        })
        .unwrap();
        assert_eq!(destination.state, "NJ");
    }

    #[test]
    fn test_validate_destination_rejects_bad_input() {
        for (state, miles) in [
            ("New York", 1.0),
            ("N1", 1.0),
            ("NY", -1.0),
            ("NY", f64::NAN),
            ("NY", 250.0),
        ] {
            let result = validate_destination(Destination {
                state: state.to_string(),
                distance_miles: miles,
            });
            assert!(matches!(result, Err(AppError::BadRequest(_))), "{state} {miles}");
        }
    }

    #[test]
    fn test_empty_cart_view_has_no_checkout() {
        let view = CartView::from(&Cart::new());
        assert!(view.is_empty);
        assert!(!view.checkout_available);
        assert_eq!(view.summary.total, Decimal::ZERO);
    }
}
