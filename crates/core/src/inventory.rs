//! Inventory ledger merging POS-synced stock with manual back-office entries.
//!
//! POS items are replaced wholesale on every sync. Manual entries are owned
//! by the back office and are the only ones that can be removed by hand.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::ProductId;

/// Where an inventory record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InventorySource {
    Alleaves,
    Manual,
}

/// Inventory record ID. POS records use `alleaves-*`, manual ones `manual-N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryItemId(String);

impl InventoryItemId {
    /// Wrap a raw ID string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for InventoryItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stock of one product batch at one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub id: InventoryItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub location: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
    pub source: InventorySource,
}

/// Fields for a manual inventory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewInventoryItem {
    pub product_id: ProductId,
    pub quantity: u32,
    pub location: String,
    #[serde(default)]
    pub batch_number: Option<String>,
    #[serde(default)]
    pub expiration_date: Option<NaiveDate>,
}

/// Errors from ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("inventory item not found: {0}")]
    NotFound(InventoryItemId),

    #[error("inventory item {0} is synced from the POS and cannot be removed")]
    NotManual(InventoryItemId),

    #[error("location must not be empty")]
    EmptyLocation,
}

/// POS and manual inventory, in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLedger {
    pos_items: Vec<InventoryItem>,
    manual_items: Vec<InventoryItem>,
    last_manual_id: u64,
}

impl InventoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a ledger from persisted manual entries and the last manual
    /// ID number handed out.
    ///
    /// Numbering resumes after `last_manual_id` or the highest `manual-N`
    /// present, whichever is larger, so removed IDs are never reissued.
    #[must_use]
    pub fn with_manual_items(manual_items: Vec<InventoryItem>, last_manual_id: u64) -> Self {
        let highest = manual_items
            .iter()
            .filter_map(|item| item.id.as_str().strip_prefix("manual-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        Self {
            pos_items: Vec::new(),
            manual_items,
            last_manual_id: last_manual_id.max(highest),
        }
    }

    /// Number of the most recently issued `manual-N` ID, 0 if none.
    #[must_use]
    pub const fn last_manual_id(&self) -> u64 {
        self.last_manual_id
    }

    /// Replace every POS-sourced item with a fresh sync.
    pub fn replace_pos_items(&mut self, items: Vec<InventoryItem>) {
        self.pos_items = items
            .into_iter()
            .map(|mut item| {
                item.source = InventorySource::Alleaves;
                item
            })
            .collect();
    }

    /// Record a manual entry and return it.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::EmptyLocation` for a blank location.
    pub fn add_manual(
        &mut self,
        new_item: NewInventoryItem,
        now: DateTime<Utc>,
    ) -> Result<InventoryItem, InventoryError> {
        let location = new_item.location.trim();
        if location.is_empty() {
            return Err(InventoryError::EmptyLocation);
        }

        self.last_manual_id += 1;
        let item = InventoryItem {
            id: InventoryItemId(format!("manual-{}", self.last_manual_id)),
            product_id: new_item.product_id,
            quantity: new_item.quantity,
            location: location.to_string(),
            batch_number: new_item.batch_number,
            expiration_date: new_item.expiration_date,
            last_updated: now,
            source: InventorySource::Manual,
        };
        self.manual_items.push(item.clone());
        Ok(item)
    }

    /// Remove a manual entry.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotManual` for POS items and
    /// `InventoryError::NotFound` for unknown IDs.
    pub fn remove_manual(&mut self, id: &InventoryItemId) -> Result<InventoryItem, InventoryError> {
        if let Some(index) = self.manual_items.iter().position(|item| &item.id == id) {
            return Ok(self.manual_items.remove(index));
        }
        if self.pos_items.iter().any(|item| &item.id == id) {
            return Err(InventoryError::NotManual(id.clone()));
        }
        Err(InventoryError::NotFound(id.clone()))
    }

    /// Set the quantity on any item.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotFound` for unknown IDs.
    pub fn update_quantity(
        &mut self,
        id: &InventoryItemId,
        quantity: u32,
        now: DateTime<Utc>,
    ) -> Result<InventoryItem, InventoryError> {
        let item = self
            .pos_items
            .iter_mut()
            .chain(self.manual_items.iter_mut())
            .find(|item| &item.id == id)
            .ok_or_else(|| InventoryError::NotFound(id.clone()))?;
        item.quantity = quantity;
        item.last_updated = now;
        Ok(item.clone())
    }

    /// Every item, POS first.
    pub fn items(&self) -> impl Iterator<Item = &InventoryItem> {
        self.pos_items.iter().chain(self.manual_items.iter())
    }

    #[must_use]
    pub fn manual_items(&self) -> &[InventoryItem] {
        &self.manual_items
    }

    #[must_use]
    pub fn get(&self, id: &InventoryItemId) -> Option<&InventoryItem> {
        self.items().find(|item| &item.id == id)
    }

    /// Units on hand for a product across every location and source.
    #[must_use]
    pub fn total_for_product(&self, product_id: ProductId) -> u64 {
        self.items()
            .filter(|item| item.product_id == product_id)
            .map(|item| u64::from(item.quantity))
            .sum()
    }

    /// Items at or below `threshold` units.
    #[must_use]
    pub fn low_stock(&self, threshold: u32) -> Vec<&InventoryItem> {
        self.items()
            .filter(|item| item.quantity <= threshold)
            .collect()
    }

    /// Items whose expiration date falls strictly before `date`.
    #[must_use]
    pub fn expiring_before(&self, date: NaiveDate) -> Vec<&InventoryItem> {
        self.items()
            .filter(|item| item.expiration_date.is_some_and(|exp| exp < date))
            .collect()
    }
}
