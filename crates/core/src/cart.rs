//! Shopping cart.
//!
//! A [`Cart`] is an ordered list of line items plus the pricing destination.
//! Lines are unique by (product, selected weight, selected size); adding a
//! matching line bumps its quantity instead of appending. Quantities never
//! drop below one. Totals are computed from the current lines on every call,
//! so there is nothing to invalidate.
//!
//! Mutations return a [`CartEvent`] describing what changed, for analytics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Product;
use crate::pricing::{Destination, PriceSummary, calculate_delivery_fee, calculate_tax};
use crate::types::{ProductId, round_cents};

/// Errors from cart mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// The product is flagged out of stock.
    #[error("product {0} is out of stock")]
    OutOfStock(ProductId),

    /// No line with this ID is in the cart.
    #[error("cart line not found: {0}")]
    LineNotFound(String),

    /// The selected weight or size is not offered for the product.
    #[error("{option} '{value}' is not available for product {product_id}")]
    InvalidOption {
        product_id: ProductId,
        option: &'static str,
        value: String,
    },
}

/// Variant choices and quantity for an add-to-cart request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItemOptions {
    #[serde(default)]
    pub weight: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    /// Units to add; defaults to one, and zero is treated as one.
    #[serde(default)]
    pub quantity: Option<u32>,
}

/// Build the stable line ID for a product/variant combination.
#[must_use]
pub fn line_id(product_id: ProductId, weight: Option<&str>, size: Option<&str>) -> String {
    format!(
        "{product_id}:{}:{}",
        weight.unwrap_or("-"),
        size.unwrap_or("-")
    )
}

/// One line in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub line_id: String,
    pub product: Product,
    pub cart_quantity: u32,
    pub selected_weight: Option<String>,
    pub selected_size: Option<String>,
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Price per unit at the time of reading.
    #[must_use]
    pub fn unit_price(&self) -> Decimal {
        self.product.effective_price()
    }

    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.unit_price() * Decimal::from(self.cart_quantity)
    }
}

/// What a cart mutation did, for analytics tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CartEvent {
    ItemAdded {
        product_id: ProductId,
        line_id: String,
        quantity: u32,
        unit_price: Decimal,
    },
    ItemRemoved {
        product_id: ProductId,
        line_id: String,
        quantity: u32,
    },
    QuantityUpdated {
        product_id: ProductId,
        line_id: String,
        quantity: u32,
    },
    Cleared {
        lines: usize,
    },
}

impl CartEvent {
    /// Short event name for logs and analytics payloads.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ItemAdded { .. } => "add_to_cart",
            Self::ItemRemoved { .. } => "remove_from_cart",
            Self::QuantityUpdated { .. } => "update_cart_quantity",
            Self::Cleared { .. } => "clear_cart",
        }
    }
}

/// A customer's cart.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
    #[serde(default)]
    destination: Destination,
}

impl Cart {
    /// Create an empty cart priced for the default destination.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Line items in the order they were first added.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Where the cart is priced for.
    #[must_use]
    pub const fn destination(&self) -> &Destination {
        &self.destination
    }

    /// Change the pricing destination.
    pub fn set_destination(&mut self, destination: Destination) {
        self.destination = destination;
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .fold(0_u32, |acc, item| acc.saturating_add(item.cart_quantity))
    }

    /// Add `product` with the given variant choices.
    ///
    /// Merges into an existing line with the same product, weight and size,
    /// otherwise appends a new line.
    ///
    /// # Errors
    ///
    /// Returns `CartError::OutOfStock` for unavailable products and
    /// `CartError::InvalidOption` for a weight or size the product does not offer.
    pub fn add_item(
        &mut self,
        product: &Product,
        options: AddItemOptions,
    ) -> Result<CartEvent, CartError> {
        if !product.is_available() {
            return Err(CartError::OutOfStock(product.id));
        }
        check_option(product, "weight", options.weight.as_deref(), &product.weights)?;
        check_option(product, "size", options.size.as_deref(), &product.sizes)?;

        let quantity = options.quantity.unwrap_or(1).max(1);
        let line_id = line_id(
            product.id,
            options.weight.as_deref(),
            options.size.as_deref(),
        );

        if let Some(existing) = self.items.iter_mut().find(|item| item.line_id == line_id) {
            existing.cart_quantity = existing.cart_quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem {
                line_id: line_id.clone(),
                product: product.clone(),
                cart_quantity: quantity,
                selected_weight: options.weight,
                selected_size: options.size,
                added_at: Utc::now(),
            });
        }

        Ok(CartEvent::ItemAdded {
            product_id: product.id,
            line_id,
            quantity,
            unit_price: product.effective_price(),
        })
    }

    /// Remove a line entirely.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn remove_item(&mut self, line_id: &str) -> Result<CartEvent, CartError> {
        let index = self
            .items
            .iter()
            .position(|item| item.line_id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
        let removed = self.items.remove(index);

        Ok(CartEvent::ItemRemoved {
            product_id: removed.product.id,
            line_id: removed.line_id,
            quantity: removed.cart_quantity,
        })
    }

    /// Set a line's quantity, clamped to at least one.
    ///
    /// # Errors
    ///
    /// Returns `CartError::LineNotFound` if no line has this ID.
    pub fn update_quantity(
        &mut self,
        line_id: &str,
        quantity: i64,
    ) -> Result<CartEvent, CartError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.line_id == line_id)
            .ok_or_else(|| CartError::LineNotFound(line_id.to_string()))?;
        item.cart_quantity = u32::try_from(quantity.max(1)).unwrap_or(u32::MAX);

        Ok(CartEvent::QuantityUpdated {
            product_id: item.product.id,
            line_id: item.line_id.clone(),
            quantity: item.cart_quantity,
        })
    }

    /// Remove every line.
    pub fn clear(&mut self) -> CartEvent {
        let lines = self.items.len();
        self.items.clear();
        CartEvent::Cleared { lines }
    }

    /// Sum of line totals.
    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        round_cents(self.items.iter().map(CartItem::line_total).sum())
    }

    /// Tax on the subtotal for the cart's destination.
    #[must_use]
    pub fn tax(&self) -> Decimal {
        calculate_tax(self.subtotal(), &self.destination.state)
    }

    /// Delivery fee for the cart's destination; zero for an empty cart.
    #[must_use]
    pub fn delivery_fee(&self) -> Decimal {
        if self.is_empty() {
            return Decimal::ZERO;
        }
        calculate_delivery_fee(self.subtotal(), self.destination.distance_miles)
    }

    /// Subtotal plus tax plus delivery.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal() + self.tax() + self.delivery_fee()
    }

    /// All derived totals at once, optionally waiving delivery for pickup.
    #[must_use]
    pub fn summary(&self, waive_delivery: bool) -> PriceSummary {
        PriceSummary::compute(self.subtotal(), &self.destination, waive_delivery)
    }
}

fn check_option(
    product: &Product,
    option: &'static str,
    selected: Option<&str>,
    offered: &[String],
) -> Result<(), CartError> {
    match selected {
        Some(value) if !offered.iter().any(|o| o == value) => Err(CartError::InvalidOption {
            product_id: product.id,
            option,
            value: value.to_string(),
        }),
        _ => Ok(()),
    }
}
