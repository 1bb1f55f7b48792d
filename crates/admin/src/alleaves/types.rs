//! Alleaves POS wire types.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::inventory::{InventoryItem, InventoryItemId, InventorySource};

/// Prefix for inventory IDs that originate in the POS.
pub const POS_ID_PREFIX: &str = "alleaves-";

/// A product as the POS knows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleavesProduct {
    pub id: String,
    pub sku: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub price: Decimal,
    #[serde(default)]
    pub thc_percent: Option<Decimal>,
    /// Catalog product this POS product is sold as online.
    #[serde(default)]
    pub storefront_id: Option<ProductId>,
    pub updated_at: DateTime<Utc>,
}

/// One inventory record in the POS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlleavesInventoryRecord {
    pub id: String,
    /// POS product ID.
    pub product_id: String,
    pub storefront_id: ProductId,
    pub quantity: u32,
    pub location: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub updated_at: DateTime<Utc>,
}

impl AlleavesInventoryRecord {
    /// Ledger entry for this record.
    #[must_use]
    pub fn to_inventory_item(&self) -> InventoryItem {
        InventoryItem {
            id: InventoryItemId::new(format!("{POS_ID_PREFIX}{}", self.id)),
            product_id: self.storefront_id,
            quantity: self.quantity,
            location: self.location.clone(),
            batch_number: self.batch_number.clone(),
            expiration_date: self.expiration_date,
            last_updated: self.updated_at,
            source: InventorySource::Alleaves,
        }
    }
}

/// POS record ID behind a ledger ID, if the item came from the POS.
#[must_use]
pub fn pos_record_id(id: &InventoryItemId) -> Option<&str> {
    id.as_str().strip_prefix(POS_ID_PREFIX)
}

/// Body of `PUT /inventory/{id}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub quantity: u32,
}

/// Response of `POST /sync`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncResult {
    pub synced: usize,
    pub synced_at: DateTime<Utc>,
}
