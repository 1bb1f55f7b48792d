//! In-process stand-in for the Alleaves POS.
//!
//! Serves a fixed product list and an inventory snapshot after a configurable
//! delay. Quantity updates stick for the life of the process.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use tracing::instrument;

use jfk_cannabis_core::ProductId;

use super::PosError;
use super::types::{AlleavesInventoryRecord, AlleavesProduct, SyncResult};

/// Mock POS backed by static data.
#[derive(Clone)]
pub struct MockAlleaves {
    delay: Duration,
    products: Arc<Vec<AlleavesProduct>>,
    inventory: Arc<RwLock<Vec<AlleavesInventoryRecord>>>,
}

impl MockAlleaves {
    /// Mock POS answering after `delay`.
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            products: Arc::new(seed_products()),
            inventory: Arc::new(RwLock::new(seed_inventory())),
        }
    }

    pub async fn products(&self) -> Result<Vec<AlleavesProduct>, PosError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.products.as_ref().clone())
    }

    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> Result<AlleavesProduct, PosError> {
        tokio::time::sleep(self.delay).await;
        self.products
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| PosError::NotFound(format!("product {id}")))
    }

    pub async fn inventory(&self) -> Result<Vec<AlleavesInventoryRecord>, PosError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.inventory.read().await.clone())
    }

    #[instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        id: &str,
        quantity: u32,
    ) -> Result<AlleavesInventoryRecord, PosError> {
        tokio::time::sleep(self.delay).await;
        let mut inventory = self.inventory.write().await;
        let record = inventory
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| PosError::NotFound(format!("inventory record {id}")))?;
        record.quantity = quantity;
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    pub async fn sync(&self) -> Result<SyncResult, PosError> {
        tokio::time::sleep(self.delay).await;
        Ok(SyncResult {
            synced: self.inventory.read().await.len(),
            synced_at: Utc::now(),
        })
    }
}

fn product(
    id: &str,
    storefront_id: i32,
    name: &str,
    brand: &str,
    category: &str,
    price_cents: i64,
    thc_tenths: Option<i64>,
) -> AlleavesProduct {
    AlleavesProduct {
        id: id.to_string(),
        sku: format!("JFK-{storefront_id:04}"),
        name: name.to_string(),
        brand: brand.to_string(),
        category: category.to_string(),
        price: Decimal::new(price_cents, 2),
        thc_percent: thc_tenths.map(|t| Decimal::new(t, 1)),
        storefront_id: Some(ProductId::new(storefront_id)),
        updated_at: Utc::now(),
    }
}

fn seed_products() -> Vec<AlleavesProduct> {
    vec![
        product("alv-001", 1, "Gelato Cake", "Hudson Valley Growers", "Flower", 4500, Some(274)),
        product("alv-002", 2, "Northern Lights", "Catskill Canna", "Flower", 4000, Some(210)),
        product("alv-003", 3, "Blue Dream", "Hudson Valley Growers", "Flower", 5500, Some(195)),
        product(
            "alv-004",
            4,
            "Sour Diesel Pre-Roll 5-Pack",
            "Catskill Canna",
            "Pre-Rolls",
            3500,
            Some(220),
        ),
        product(
            "alv-006",
            6,
            "Pineapple Express Cartridge",
            "Gotham Extracts",
            "Vapes",
            5000,
            Some(860),
        ),
        product("alv-008", 8, "Watermelon Gummies", "Empire Edibles", "Edibles", 2500, None),
        product(
            "alv-011",
            11,
            "Live Rosin Badder",
            "Gotham Extracts",
            "Concentrates",
            7000,
            Some(782),
        ),
    ]
}

fn seed_inventory() -> Vec<AlleavesInventoryRecord> {
    let now = Utc::now();
    let today = now.date_naive();
    let record = |id: &str,
                  product_id: &str,
                  storefront_id: i32,
                  quantity: u32,
                  location: &str,
                  batch: &str,
                  days: i64| AlleavesInventoryRecord {
        id: id.to_string(),
        product_id: product_id.to_string(),
        storefront_id: ProductId::new(storefront_id),
        quantity,
        location: location.to_string(),
        batch_number: Some(batch.to_string()),
        expiration_date: Some(today + TimeDelta::days(days)),
        updated_at: now,
    };

    vec![
        record("inv-1001", "alv-001", 1, 24, "Front Vault", "GC-2409", 180),
        record("inv-1002", "alv-002", 2, 18, "Front Vault", "NL-2408", 150),
        record("inv-1003", "alv-003", 3, 30, "Front Vault", "BD-2409", 200),
        record("inv-1004", "alv-004", 4, 40, "Back Room", "SD-2407", 90),
        record("inv-1006", "alv-006", 6, 6, "Display Case", "PE-2405", 365),
        record("inv-1008", "alv-008", 8, 60, "Back Room", "WG-2410", 20),
        record("inv-1011", "alv-011", 11, 3, "Back Room", "LR-2406", 45),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_mock_serves_seed_data_after_delay() {
        let mock = MockAlleaves::new(Duration::from_millis(800));
        let started = tokio::time::Instant::now();

        let products = mock.products().await.unwrap();
        assert_eq!(products.len(), 7);
        assert!(started.elapsed() >= Duration::from_millis(800));

        let inventory = mock.inventory().await.unwrap();
        assert!(inventory.iter().all(|r| r.expiration_date.is_some()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_update_persists() {
        let mock = MockAlleaves::new(Duration::from_millis(1));
        mock.update_inventory("inv-1003", 12).await.unwrap();

        let inventory = mock.inventory().await.unwrap();
        let record = inventory.iter().find(|r| r.id == "inv-1003").unwrap();
        assert_eq!(record.quantity, 12);

        assert!(matches!(
            mock.update_inventory("inv-9999", 1).await,
            Err(PosError::NotFound(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_mock_product_lookup() {
        let mock = MockAlleaves::new(Duration::from_millis(1));
        let product = mock.product("alv-003").await.unwrap();
        assert_eq!(product.price, Decimal::new(5500, 2));
        assert_eq!(product.storefront_id, Some(ProductId::new(3)));
        assert!(mock.product("alv-404").await.is_err());
    }
}
