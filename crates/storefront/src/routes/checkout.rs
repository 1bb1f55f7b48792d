//! Checkout route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use jfk_cannabis_core::cart::Cart;
use jfk_cannabis_core::checkout::{self, CheckoutForm, CheckoutStatus, DeliveryMethod};
use jfk_cannabis_core::pricing::PriceSummary;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::middleware::RequireAgeVerified;
use crate::models::session_keys;
use crate::services::{IdVerification, OrderConfirmation};
use crate::state::AppState;

/// Simulated ID upload request.
#[derive(Debug, Deserialize)]
pub struct IdUploadRequest {
    /// e.g. `drivers_license`, `passport`, `state_id`
    pub document_type: String,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Checkout status response.
#[derive(Debug, Serialize)]
pub struct CheckoutStatusView {
    pub status: CheckoutStatus,
    pub id_verified: bool,
}

/// `?delivery_method=` query parameter for quotes.
#[derive(Debug, Default, Deserialize)]
pub struct QuoteQuery {
    #[serde(default)]
    pub delivery_method: DeliveryMethod,
}

/// Simulate uploading a government ID.
#[instrument(skip(state, session, _age, request), fields(document_type = %request.document_type))]
pub async fn id_upload(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
    Json(request): Json<IdUploadRequest>,
) -> Result<Json<IdVerification>> {
    if request.document_type.trim().is_empty() {
        return Err(AppError::BadRequest("document_type is required".to_string()));
    }
    if request
        .file_name
        .as_deref()
        .is_some_and(|name| name.trim().is_empty())
    {
        return Err(AppError::BadRequest("file_name must not be blank".to_string()));
    }

    let verification = state.checkout().verify_id(&session).await?;
    Ok(Json(verification))
}

/// Place the order.
#[instrument(skip(state, session, _age, form))]
pub async fn place_order(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
    Json(form): Json<CheckoutForm>,
) -> Result<Json<OrderConfirmation>> {
    let confirmation = state.checkout().place_order(&session, form).await?;
    add_breadcrumb(
        "checkout",
        "Order placed",
        &[("order_number", confirmation.order_number.clone())],
    );
    Ok(Json(confirmation))
}

/// Latest checkout status for the session.
#[instrument(skip(state, session, _age))]
pub async fn status(
    State(state): State<AppState>,
    _age: RequireAgeVerified,
    session: Session,
) -> Result<Json<CheckoutStatusView>> {
    let status = state.checkout().status(&session).await?;
    let id_verified = session
        .get::<bool>(session_keys::ID_VERIFIED)
        .await?
        .unwrap_or(false);
    Ok(Json(CheckoutStatusView {
        status,
        id_verified,
    }))
}

/// Totals for the current cart and delivery method.
#[instrument(skip(session, _age))]
pub async fn quote(
    _age: RequireAgeVerified,
    session: Session,
    Query(query): Query<QuoteQuery>,
) -> Result<Json<PriceSummary>> {
    let cart: Cart = session
        .get(session_keys::CART)
        .await?
        .unwrap_or_default();
    let form = CheckoutForm {
        delivery_method: query.delivery_method,
        ..CheckoutForm::default()
    };
    Ok(Json(checkout::quote(&cart, &form)))
}
