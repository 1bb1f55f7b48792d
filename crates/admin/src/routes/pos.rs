//! Alleaves POS route handlers.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::instrument;

use jfk_cannabis_core::Permission;

use crate::alleaves::{AlleavesInventoryRecord, AlleavesProduct};
use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Sync outcome.
#[derive(Debug, Serialize)]
pub struct SyncResponse {
    pub backend: &'static str,
    pub synced: usize,
    pub synced_at: DateTime<Utc>,
    /// Ledger size after the sync, POS and manual.
    pub inventory_total: usize,
}

/// Pull a fresh inventory snapshot from the POS into the ledger.
#[instrument(skip(state, auth))]
pub async fn sync(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
) -> Result<Json<SyncResponse>> {
    let admin = auth.require(Permission::SyncPos)?;

    let (result, records) = state.pos().sync().await?;
    let items = records
        .iter()
        .map(AlleavesInventoryRecord::to_inventory_item)
        .collect();
    state.inventory().replace_pos_items(items).await;

    tracing::info!(admin_id = %admin.user.id, synced = result.synced, "Inventory synced from POS");
    Ok(Json(SyncResponse {
        backend: state.pos().backend().name(),
        synced: result.synced,
        synced_at: result.synced_at,
        inventory_total: state.inventory().items().await.len(),
    }))
}

/// POS product list (cached for 5 minutes).
#[instrument(skip(state, auth))]
pub async fn products(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
) -> Result<Json<Vec<AlleavesProduct>>> {
    auth.require(Permission::ViewProducts)?;
    let products = state.pos().products().await?;
    Ok(Json(products.as_ref().clone()))
}

/// One POS product.
#[instrument(skip(state, auth))]
pub async fn product(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Path(id): Path<String>,
) -> Result<Json<AlleavesProduct>> {
    auth.require(Permission::ViewProducts)?;
    Ok(Json(state.pos().product(&id).await?))
}
