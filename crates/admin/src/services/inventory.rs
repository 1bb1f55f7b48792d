//! Inventory store shared by the inventory and POS routes.
//!
//! Wraps the core [`InventoryLedger`] in an async `RwLock`. Manual entries
//! are written to a JSON file after every change when a path is configured;
//! POS items are never persisted since the next sync replaces them.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::inventory::{
    InventoryError, InventoryItem, InventoryItemId, InventoryLedger, InventorySource,
    NewInventoryItem,
};

/// Errors from the inventory store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error("inventory file I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error("inventory file format: {0}")]
    Json(#[from] serde_json::Error),
}

/// On-disk layout of the manual inventory file.
#[derive(Debug, Default, Serialize, Deserialize)]
struct ManualInventoryFile {
    /// Highest `manual-N` number ever issued, including removed entries.
    #[serde(default)]
    last_manual_id: u64,
    items: Vec<InventoryItem>,
}

/// Shared, optionally persisted inventory ledger.
#[derive(Clone)]
pub struct InventoryStore {
    inner: Arc<InventoryStoreInner>,
}

struct InventoryStoreInner {
    ledger: RwLock<InventoryLedger>,
    path: Option<PathBuf>,
}

impl InventoryStore {
    /// Store that keeps everything in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::with_ledger(InventoryLedger::new(), None)
    }

    fn with_ledger(ledger: InventoryLedger, path: Option<PathBuf>) -> Self {
        Self {
            inner: Arc::new(InventoryStoreInner {
                ledger: RwLock::new(ledger),
                path,
            }),
        }
    }

    /// Open a store persisted at `path`, loading existing manual entries.
    ///
    /// A missing file starts an empty ledger.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed.
    #[instrument]
    pub async fn open(path: &Path) -> Result<Self, StoreError> {
        let file = match tokio::fs::read(path).await {
            Ok(bytes) => serde_json::from_slice::<ManualInventoryFile>(&bytes)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => ManualInventoryFile::default(),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(
            entries = file.items.len(),
            last_manual_id = file.last_manual_id,
            "Manual inventory loaded"
        );

        let manual_items = file
            .items
            .into_iter()
            .filter(|item| item.source == InventorySource::Manual)
            .collect();
        Ok(Self::with_ledger(
            InventoryLedger::with_manual_items(manual_items, file.last_manual_id),
            Some(path.to_path_buf()),
        ))
    }

    /// Every item, POS first.
    pub async fn items(&self) -> Vec<InventoryItem> {
        self.inner.ledger.read().await.items().cloned().collect()
    }

    pub async fn get(&self, id: &InventoryItemId) -> Option<InventoryItem> {
        self.inner.ledger.read().await.get(id).cloned()
    }

    /// Units on hand for a product.
    pub async fn total_for_product(&self, product_id: ProductId) -> u64 {
        self.inner.ledger.read().await.total_for_product(product_id)
    }

    /// Items at or below `threshold` units.
    pub async fn low_stock(&self, threshold: u32) -> Vec<InventoryItem> {
        self.inner
            .ledger
            .read()
            .await
            .low_stock(threshold)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Items expiring strictly before `date`.
    pub async fn expiring_before(&self, date: NaiveDate) -> Vec<InventoryItem> {
        self.inner
            .ledger
            .read()
            .await
            .expiring_before(date)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Record a manual entry.
    ///
    /// Changes are applied to a copy of the ledger and only become visible
    /// once persisted.
    ///
    /// # Errors
    ///
    /// Returns error if the entry is invalid or cannot be persisted.
    #[instrument(skip(self))]
    pub async fn add_manual(
        &self,
        new_item: NewInventoryItem,
    ) -> Result<InventoryItem, StoreError> {
        let mut ledger = self.inner.ledger.write().await;
        let mut updated = ledger.clone();
        let item = updated.add_manual(new_item, Utc::now())?;
        self.persist(&updated).await?;
        *ledger = updated;
        Ok(item)
    }

    /// Remove a manual entry.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotManual` for POS items, or an I/O error if
    /// the removal cannot be persisted.
    #[instrument(skip(self))]
    pub async fn remove_manual(&self, id: &InventoryItemId) -> Result<InventoryItem, StoreError> {
        let mut ledger = self.inner.ledger.write().await;
        let mut updated = ledger.clone();
        let item = updated.remove_manual(id)?;
        self.persist(&updated).await?;
        *ledger = updated;
        Ok(item)
    }

    /// Set the quantity on any item.
    ///
    /// # Errors
    ///
    /// Returns `InventoryError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn update_quantity(
        &self,
        id: &InventoryItemId,
        quantity: u32,
    ) -> Result<InventoryItem, StoreError> {
        let mut ledger = self.inner.ledger.write().await;
        let mut updated = ledger.clone();
        let item = updated.update_quantity(id, quantity, Utc::now())?;
        if item.source == InventorySource::Manual {
            self.persist(&updated).await?;
        }
        *ledger = updated;
        Ok(item)
    }

    /// Swap in a fresh POS snapshot.
    pub async fn replace_pos_items(&self, items: Vec<InventoryItem>) {
        let count = items.len();
        self.inner.ledger.write().await.replace_pos_items(items);
        tracing::debug!(count, "POS inventory replaced");
    }

    /// Write manual entries to disk (temp file, then rename).
    async fn persist(&self, ledger: &InventoryLedger) -> Result<(), StoreError> {
        let Some(path) = &self.inner.path else {
            return Ok(());
        };
        let file = ManualInventoryFile {
            last_manual_id: ledger.last_manual_id(),
            items: ledger.manual_items().to_vec(),
        };
        let json = serde_json::to_vec_pretty(&file)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
