//! Alleaves point-of-sale integration.
//!
//! # Architecture
//!
//! - [`AlleavesClient`] talks to the live REST API
//! - [`MockAlleaves`] serves static data after a fixed delay
//! - [`PosBackend`] picks one of the two at startup
//! - [`PosService`] wraps every call in a timeout and caches product
//!   listings with `moka` (5 minute TTL)

pub mod client;
pub mod mock;
pub mod types;

pub use client::AlleavesClient;
pub use mock::MockAlleaves;
pub use types::*;

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use thiserror::Error;
use tracing::instrument;

use crate::config::AlleavesConfig;

/// Cache key for the product listing.
const PRODUCTS_KEY: &str = "products";

/// Product listing TTL.
const PRODUCTS_TTL: Duration = Duration::from_secs(300);

/// Errors that can occur when interacting with the POS.
#[derive(Debug, Error)]
pub enum PosError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// POS returned an error status.
    #[error("POS error {status}: {message}")]
    Api { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the POS.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Call did not finish in time.
    #[error("POS did not respond within {0:?}")]
    Timeout(Duration),

    /// Client misconfigured.
    #[error("Invalid POS configuration: {0}")]
    InvalidConfig(String),
}

/// Live or mocked POS.
#[derive(Clone)]
pub enum PosBackend {
    Live(AlleavesClient),
    Mock(MockAlleaves),
}

impl PosBackend {
    /// Live client when credentials are configured, mock otherwise.
    ///
    /// # Errors
    ///
    /// Returns error if the live client cannot be built.
    pub fn from_config(config: &AlleavesConfig) -> Result<Self, PosError> {
        match config.live_credentials() {
            Some((base_url, api_key)) => Ok(Self::Live(AlleavesClient::new(base_url, api_key)?)),
            None => Ok(Self::Mock(MockAlleaves::new(config.mock_delay))),
        }
    }

    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Live(_) => "alleaves",
            Self::Mock(_) => "mock",
        }
    }

    async fn products(&self) -> Result<Vec<AlleavesProduct>, PosError> {
        match self {
            Self::Live(client) => client.products().await,
            Self::Mock(mock) => mock.products().await,
        }
    }

    async fn product(&self, id: &str) -> Result<AlleavesProduct, PosError> {
        match self {
            Self::Live(client) => client.product(id).await,
            Self::Mock(mock) => mock.product(id).await,
        }
    }

    async fn inventory(&self) -> Result<Vec<AlleavesInventoryRecord>, PosError> {
        match self {
            Self::Live(client) => client.inventory().await,
            Self::Mock(mock) => mock.inventory().await,
        }
    }

    async fn update_inventory(
        &self,
        id: &str,
        quantity: u32,
    ) -> Result<AlleavesInventoryRecord, PosError> {
        match self {
            Self::Live(client) => client.update_inventory(id, quantity).await,
            Self::Mock(mock) => mock.update_inventory(id, quantity).await,
        }
    }

    async fn sync(&self) -> Result<SyncResult, PosError> {
        match self {
            Self::Live(client) => client.sync().await,
            Self::Mock(mock) => mock.sync().await,
        }
    }
}

/// POS access with timeouts and a product cache.
#[derive(Clone)]
pub struct PosService {
    backend: PosBackend,
    timeout: Duration,
    products: Cache<&'static str, Arc<Vec<AlleavesProduct>>>,
}

impl PosService {
    #[must_use]
    pub fn new(backend: PosBackend, timeout: Duration) -> Self {
        let products = Cache::builder()
            .max_capacity(1)
            .time_to_live(PRODUCTS_TTL)
            .build();

        Self {
            backend,
            timeout,
            products,
        }
    }

    /// Build from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the live client cannot be built.
    pub fn from_config(config: &AlleavesConfig) -> Result<Self, PosError> {
        Ok(Self::new(PosBackend::from_config(config)?, config.timeout))
    }

    #[must_use]
    pub const fn backend(&self) -> &PosBackend {
        &self.backend
    }

    async fn with_timeout<T>(
        &self,
        call: impl Future<Output = Result<T, PosError>>,
    ) -> Result<T, PosError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| PosError::Timeout(self.timeout))?
    }

    /// POS product list (cached).
    ///
    /// # Errors
    ///
    /// Returns error if the POS call fails or times out.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn products(&self) -> Result<Arc<Vec<AlleavesProduct>>, PosError> {
        if let Some(cached) = self.products.get(PRODUCTS_KEY).await {
            tracing::debug!("POS product cache hit");
            return Ok(cached);
        }

        let products = Arc::new(self.with_timeout(self.backend.products()).await?);
        self.products
            .insert(PRODUCTS_KEY, Arc::clone(&products))
            .await;
        Ok(products)
    }

    /// One POS product.
    ///
    /// # Errors
    ///
    /// Returns `PosError::NotFound` for unknown IDs.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn product(&self, id: &str) -> Result<AlleavesProduct, PosError> {
        self.with_timeout(self.backend.product(id)).await
    }

    /// POS inventory records.
    ///
    /// # Errors
    ///
    /// Returns error if the POS call fails or times out.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn inventory(&self) -> Result<Vec<AlleavesInventoryRecord>, PosError> {
        self.with_timeout(self.backend.inventory()).await
    }

    /// Push a quantity change to the POS.
    ///
    /// # Errors
    ///
    /// Returns `PosError::NotFound` for unknown records.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn update_inventory(
        &self,
        id: &str,
        quantity: u32,
    ) -> Result<AlleavesInventoryRecord, PosError> {
        self.with_timeout(self.backend.update_inventory(id, quantity))
            .await
    }

    /// Run a POS sync and return the fresh inventory snapshot.
    ///
    /// Drops the cached product listing.
    ///
    /// # Errors
    ///
    /// Returns error if either POS call fails or times out.
    #[instrument(skip(self), fields(backend = self.backend.name()))]
    pub async fn sync(&self) -> Result<(SyncResult, Vec<AlleavesInventoryRecord>), PosError> {
        let result = self.with_timeout(self.backend.sync()).await?;
        self.products.invalidate(PRODUCTS_KEY).await;
        let records = self.inventory().await?;
        tracing::info!(synced = result.synced, "POS sync complete");
        Ok((result, records))
    }
}
