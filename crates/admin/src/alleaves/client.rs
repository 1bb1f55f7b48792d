//! Alleaves POS REST client.
//!
//! Endpoints, relative to the configured base URL:
//!
//! ```text
//! GET  /products          - Product list
//! GET  /products/{id}     - Single product
//! GET  /inventory         - Inventory records
//! PUT  /inventory/{id}    - Set a record's quantity
//! POST /sync              - Ask the POS to refresh its inventory snapshot
//! ```

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use super::PosError;
use super::types::{AlleavesInventoryRecord, AlleavesProduct, InventoryUpdate, SyncResult};

/// Alleaves POS API client.
#[derive(Clone)]
pub struct AlleavesClient {
    inner: Arc<AlleavesClientInner>,
}

struct AlleavesClientInner {
    client: reqwest::Client,
    base_url: Url,
}

impl AlleavesClient {
    /// Create a client for `base_url` authenticating with `api_key`.
    ///
    /// # Errors
    ///
    /// Returns `PosError::InvalidConfig` if the base URL cannot carry a path
    /// or the key is not a valid header value, and `PosError::Http` if the
    /// HTTP client fails to build.
    pub fn new(base_url: &Url, api_key: &SecretString) -> Result<Self, PosError> {
        if base_url.cannot_be_a_base() {
            return Err(PosError::InvalidConfig(format!(
                "{base_url} cannot be used as a base URL"
            )));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
            .map_err(|e| PosError::InvalidConfig(e.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            inner: Arc::new(AlleavesClientInner {
                client,
                base_url: base_url.clone(),
            }),
        })
    }

    /// Build an endpoint URL from path segments (each percent-encoded).
    fn endpoint(&self, segments: &[&str]) -> Result<Url, PosError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| PosError::InvalidConfig("base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode the JSON response.
    async fn send<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        resource: &str,
    ) -> Result<T, PosError> {
        let response = request.send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(PosError::NotFound(resource.to_string()));
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(PosError::RateLimited(retry_after));
        }

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PosError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }

    /// List POS products.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the POS rejects it.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Vec<AlleavesProduct>, PosError> {
        let url = self.endpoint(&["products"])?;
        self.send(self.inner.client.get(url), "products").await
    }

    /// Fetch one POS product.
    ///
    /// # Errors
    ///
    /// Returns `PosError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn product(&self, id: &str) -> Result<AlleavesProduct, PosError> {
        let url = self.endpoint(&["products", id])?;
        self.send(self.inner.client.get(url), &format!("product {id}"))
            .await
    }

    /// List inventory records.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the POS rejects it.
    #[instrument(skip(self))]
    pub async fn inventory(&self) -> Result<Vec<AlleavesInventoryRecord>, PosError> {
        let url = self.endpoint(&["inventory"])?;
        self.send(self.inner.client.get(url), "inventory").await
    }

    /// Set the quantity of one inventory record.
    ///
    /// # Errors
    ///
    /// Returns `PosError::NotFound` for unknown IDs.
    #[instrument(skip(self))]
    pub async fn update_inventory(
        &self,
        id: &str,
        quantity: u32,
    ) -> Result<AlleavesInventoryRecord, PosError> {
        let url = self.endpoint(&["inventory", id])?;
        self.send(
            self.inner.client.put(url).json(&InventoryUpdate { quantity }),
            &format!("inventory record {id}"),
        )
        .await
    }

    /// Trigger a POS-side inventory sync.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the POS rejects it.
    #[instrument(skip(self))]
    pub async fn sync(&self) -> Result<SyncResult, PosError> {
        let url = self.endpoint(&["sync"])?;
        self.send(self.inner.client.post(url), "sync").await
    }
}
