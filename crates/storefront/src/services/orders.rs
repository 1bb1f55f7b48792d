//! Simulated order gateway.
//!
//! Stands in for the order management system. Accepting an order takes a
//! configurable amount of time and yields an order number.

use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distr::Alphanumeric;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::cart::Cart;
use jfk_cannabis_core::checkout::{CheckoutForm, DeliveryMethod, PaymentMethod};
use jfk_cannabis_core::pricing::PriceSummary;

/// Errors from the order gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// The gateway refused the order.
    #[error("order rejected: {0}")]
    Rejected(String),
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub weight: Option<String>,
    pub size: Option<String>,
}

/// Everything the gateway needs to place an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub lines: Vec<OrderLine>,
    pub summary: PriceSummary,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub address: Option<String>,
}

impl OrderRequest {
    /// Snapshot the cart and form into an order.
    #[must_use]
    pub fn new(cart: &Cart, form: &CheckoutForm, summary: PriceSummary) -> Self {
        let lines = cart
            .items()
            .iter()
            .map(|item| OrderLine {
                product_id: item.product.id,
                name: item.product.name.clone(),
                quantity: item.cart_quantity,
                unit_price: item.unit_price(),
                weight: item.selected_weight.clone(),
                size: item.selected_size.clone(),
            })
            .collect();

        let address = match form.delivery_method {
            DeliveryMethod::Delivery => Some(form.address.trim().to_string()),
            DeliveryMethod::Pickup => None,
        };

        Self {
            lines,
            summary,
            delivery_method: form.delivery_method,
            payment_method: form.payment_method,
            address,
        }
    }
}

/// What the gateway returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_number: String,
    pub placed_at: DateTime<Utc>,
}

/// Simulated order management system.
#[derive(Debug, Clone)]
pub struct OrderGateway {
    latency: Duration,
}

impl OrderGateway {
    #[must_use]
    pub const fn new(latency: Duration) -> Self {
        Self { latency }
    }

    #[must_use]
    pub const fn latency(&self) -> Duration {
        self.latency
    }

    /// Place an order after the configured latency.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Rejected` for orders with no lines or no total.
    #[tracing::instrument(skip(self, request), fields(lines = request.lines.len()))]
    pub async fn submit(&self, request: &OrderRequest) -> Result<OrderReceipt, OrderError> {
        tokio::time::sleep(self.latency).await;

        if request.lines.is_empty() || request.summary.total <= Decimal::ZERO {
            return Err(OrderError::Rejected("order has no billable items".to_string()));
        }

        let placed_at = Utc::now();
        let order_number = order_number(placed_at, &mut rand::rng());
        tracing::info!(%order_number, total = %request.summary.total, "Order accepted");

        Ok(OrderReceipt {
            order_number,
            placed_at,
        })
    }
}

/// Order numbers look like `JFK-20240614-7QK2ZD`.
fn order_number<R: Rng + ?Sized>(placed_at: DateTime<Utc>, rng: &mut R) -> String {
    let suffix: String = (0..6)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_uppercase())
        .collect();
    format!("JFK-{}-{suffix}", placed_at.format("%Y%m%d"))
}
