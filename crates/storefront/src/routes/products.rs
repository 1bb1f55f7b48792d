//! Product catalog route handlers.
//!
//! Catalog routes are public; no age gate or session is needed to browse.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::catalog::{Catalog, Category, Product, ProductFilter};
use jfk_cannabis_core::lab::LabReport;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Default number of featured or related products returned.
const DEFAULT_LIMIT: usize = 4;

/// Upper bound on `limit` query parameters.
const MAX_LIMIT: usize = 24;

/// Product with its derived pricing fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub effective_price: Decimal,
    pub on_sale: bool,
    pub discount_percent: Option<u32>,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            effective_price: product.effective_price(),
            on_sale: product.is_on_sale(),
            discount_percent: product.discount_percent(),
            product: product.clone(),
        }
    }
}

/// Product listing response.
#[derive(Debug, Clone, Serialize)]
pub struct ProductList {
    pub products: Vec<ProductView>,
    pub total: usize,
}

impl ProductList {
    fn new(products: &[&Product]) -> Self {
        Self {
            total: products.len(),
            products: products.iter().map(|&p| ProductView::from(p)).collect(),
        }
    }
}

/// Lab summary shown on the product page.
#[derive(Debug, Clone, Serialize)]
pub struct LabSummary {
    #[serde(flatten)]
    pub report: LabReport,
    pub total_cannabinoids: Decimal,
    pub passed_all_contaminants: bool,
    pub entourage_labels: Vec<&'static str>,
}

impl From<&LabReport> for LabSummary {
    fn from(report: &LabReport) -> Self {
        Self {
            total_cannabinoids: report.total_cannabinoids(),
            passed_all_contaminants: report.passed_all_contaminants(),
            entourage_labels: report.entourage_labels(),
            report: report.clone(),
        }
    }
}

/// Product detail response.
#[derive(Debug, Clone, Serialize)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub view: ProductView,
    pub lab: Option<LabSummary>,
}

/// `?limit=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

impl LimitQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// `?subcategory=` query parameter.
#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub subcategory: Option<String>,
}

/// Filtered, sorted product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ProductFilter>,
) -> Json<ProductList> {
    Json(ProductList::new(&state.catalog().filter(&filter)))
}

/// Featured products.
#[instrument(skip(state))]
pub async fn featured(
    State(state): State<AppState>,
    Query(query): Query<LimitQuery>,
) -> Json<ProductList> {
    Json(ProductList::new(
        &state.catalog().featured_products(query.limit()),
    ))
}

/// Products on sale.
#[instrument(skip(state))]
pub async fn sale(State(state): State<AppState>) -> Json<ProductList> {
    Json(ProductList::new(&state.catalog().sale_products()))
}

/// Product detail with lab summary.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>> {
    let product = find(state.catalog(), id)?;

    Ok(Json(ProductDetail {
        view: ProductView::from(product),
        lab: product.lab_report.as_ref().map(LabSummary::from),
    }))
}

/// Products to show alongside product `id`.
#[instrument(skip(state))]
pub async fn related(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<ProductList>> {
    find(state.catalog(), id)?;
    let related = state
        .catalog()
        .related_products(id, query.limit(), &mut rand::rng());
    Ok(Json(ProductList::new(&related)))
}

/// Products in one category, optionally narrowed by subcategory.
#[instrument(skip(state))]
pub async fn by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(query): Query<CategoryQuery>,
) -> Result<Json<ProductList>> {
    let category: Category = category.parse().map_err(AppError::NotFound)?;
    let products = state
        .catalog()
        .products_by_category(category, query.subcategory.as_deref());
    Ok(Json(ProductList::new(&products)))
}

fn find(catalog: &Catalog, id: ProductId) -> Result<&Product> {
    catalog
        .get(id)
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))
}
