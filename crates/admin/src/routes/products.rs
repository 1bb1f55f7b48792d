//! Product route handlers.

use axum::{
    Json,
    extract::{Query, State},
};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::instrument;

use jfk_cannabis_core::catalog::{Category, ProductFilter};
use jfk_cannabis_core::{Permission, ProductId};

use crate::error::Result;
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Catalog product with back-office stock figures.
#[derive(Debug, Serialize)]
pub struct AdminProductView {
    pub id: ProductId,
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub price: Decimal,
    pub sale_price: Option<Decimal>,
    pub effective_price: Decimal,
    pub in_stock: bool,
    /// Stock figure published to the storefront.
    pub listed_quantity: u32,
    /// Units across every ledger entry.
    pub on_hand: u64,
}

/// Product listing response.
#[derive(Debug, Serialize)]
pub struct AdminProductList {
    pub products: Vec<AdminProductView>,
    pub total: usize,
}

/// Catalog products with ledger totals.
#[instrument(skip(state, auth))]
pub async fn index(
    State(state): State<AppState>,
    auth: RequireAdminAuth,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<AdminProductList>> {
    auth.require(Permission::ViewProducts)?;

    let mut products = Vec::new();
    for product in state.catalog().filter(&filter) {
        products.push(AdminProductView {
            id: product.id,
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category,
            price: product.price,
            sale_price: product.sale_price,
            effective_price: product.effective_price(),
            in_stock: product.in_stock,
            listed_quantity: product.stock_quantity,
            on_hand: state.inventory().total_for_product(product.id).await,
        });
    }

    Ok(Json(AdminProductList {
        total: products.len(),
        products,
    }))
}
