//! Inventory route handlers.
//!
//! Listing and reporting need `view_inventory`; changes need
//! `manage_inventory`. Quantity changes to POS items are pushed to the POS
//! before the ledger is updated.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use jfk_cannabis_core::inventory::{
    InventoryItem, InventoryItemId, InventorySource, NewInventoryItem,
};
use jfk_cannabis_core::{Permission, ProductId};

use crate::alleaves::pos_record_id;
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Default window for the expiring report, in days.
const DEFAULT_EXPIRY_WINDOW_DAYS: u32 = 30;

/// Inventory listing response.
#[derive(Debug, Serialize)]
pub struct InventoryList {
    pub items: Vec<InventoryItem>,
    pub total: usize,
}

impl From<Vec<InventoryItem>> for InventoryList {
    fn from(items: Vec<InventoryItem>) -> Self {
        Self {
            total: items.len(),
            items,
        }
    }
}

/// `GET /api/inventory` filters.
#[derive(Debug, Default, Deserialize)]
pub struct InventoryQuery {
    pub product_id: Option<ProductId>,
    pub source: Option<InventorySource>,
}

/// `?threshold=` for the low stock report.
#[derive(Debug, Default, Deserialize)]
pub struct LowStockQuery {
    pub threshold: Option<u32>,
}

/// `?days=` for the expiring report.
#[derive(Debug, Default, Deserialize)]
pub struct ExpiringQuery {
    pub days: Option<u32>,
}

/// Quantity change.
#[derive(Debug, Deserialize)]
pub struct UpdateQuantityRequest {
    pub quantity: u32,
}

/// All inventory, POS first.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Query(query): Query<InventoryQuery>,
) -> Result<Json<InventoryList>> {
    auth.require(Permission::ViewInventory)?;

    let items = state
        .inventory()
        .items()
        .await
        .into_iter()
        .filter(|item| query.product_id.is_none_or(|id| item.product_id == id))
        .filter(|item| query.source.is_none_or(|source| item.source == source))
        .collect::<Vec<_>>();
    Ok(Json(items.into()))
}

/// Record a manual entry.
#[instrument(skip(state, auth))]
pub async fn create(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Json(new_item): Json<NewInventoryItem>,
) -> Result<(StatusCode, Json<InventoryItem>)> {
    let admin = auth.require(Permission::ManageInventory)?;

    if state.catalog().get(new_item.product_id).is_none() {
        return Err(AppError::BadRequest(format!(
            "unknown product {}",
            new_item.product_id
        )));
    }

    let item = state.inventory().add_manual(new_item).await?;
    tracing::info!(item_id = %item.id, admin_id = %admin.user.id, "Manual inventory added");
    Ok((StatusCode::CREATED, Json(item)))
}

/// Set an item's quantity.
#[instrument(skip(state, auth))]
pub async fn update(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Path(id): Path<String>,
    Json(request): Json<UpdateQuantityRequest>,
) -> Result<Json<InventoryItem>> {
    let admin = auth.require(Permission::ManageInventory)?;
    let id = InventoryItemId::new(id);

    let existing = state
        .inventory()
        .get(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("inventory item {id}")))?;

    let pos_id = pos_record_id(&id).filter(|_| existing.source == InventorySource::Alleaves);
    if let Some(record_id) = pos_id {
        state
            .pos()
            .update_inventory(record_id, request.quantity)
            .await?;
    }

    let item = state
        .inventory()
        .update_quantity(&id, request.quantity)
        .await?;
    tracing::info!(item_id = %item.id, quantity = item.quantity, admin_id = %admin.user.id, "Inventory quantity set");
    Ok(Json(item))
}

/// Remove a manual entry.
#[instrument(skip(state, auth))]
pub async fn delete(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Json<InventoryItem>> {
    let admin = auth.require(Permission::ManageInventory)?;
    let item = state
        .inventory()
        .remove_manual(&InventoryItemId::new(id))
        .await?;
    tracing::info!(item_id = %item.id, admin_id = %admin.user.id, "Manual inventory removed");
    Ok(Json(item))
}

/// Items at or below the low stock threshold.
#[instrument(skip(state, auth))]
pub async fn low_stock(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Query(query): Query<LowStockQuery>,
) -> Result<Json<InventoryList>> {
    auth.require(Permission::ViewInventory)?;
    let threshold = query
        .threshold
        .unwrap_or(state.config().low_stock_threshold);
    Ok(Json(state.inventory().low_stock(threshold).await.into()))
}

/// Items expiring within `days` days.
#[instrument(skip(state, auth))]
pub async fn expiring(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<InventoryList>> {
    auth.require(Permission::ViewInventory)?;
    let days = query.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS);
    let cutoff = Utc::now()
        .date_naive()
        .checked_add_signed(TimeDelta::days(i64::from(days)))
        .ok_or_else(|| AppError::BadRequest(format!("days out of range: {days}")))?;
    Ok(Json(state.inventory().expiring_before(cutoff).await.into()))
}
