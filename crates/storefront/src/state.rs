//! Application state shared across handlers.

use std::sync::Arc;

use jfk_cannabis_core::catalog::Catalog;

use crate::config::StorefrontConfig;
use crate::services::analytics::AnalyticsError;
use crate::services::{AnalyticsTracker, CheckoutService};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("invalid product catalog: {0}")]
    Catalog(#[from] serde_json::Error),
    #[error("analytics client: {0}")]
    Analytics(#[from] AnalyticsError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The catalog is read-only;
/// per-visitor state lives in the session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    catalog: Catalog,
    analytics: AnalyticsTracker,
    checkout: CheckoutService,
}

impl AppState {
    /// Create application state with the embedded product catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog fixture is invalid or the analytics
    /// client cannot be built.
    pub fn new(config: StorefrontConfig) -> Result<Self, StateError> {
        let catalog = Catalog::from_fixtures()?;
        Self::with_catalog(config, catalog)
    }

    /// Create application state serving `catalog`.
    ///
    /// # Errors
    ///
    /// Returns an error if the analytics client cannot be built.
    pub fn with_catalog(config: StorefrontConfig, catalog: Catalog) -> Result<Self, StateError> {
        let analytics = AnalyticsTracker::new(&config.analytics)?;
        let checkout = CheckoutService::new(&config.checkout);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                analytics,
                checkout,
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Get a reference to the analytics tracker.
    #[must_use]
    pub fn analytics(&self) -> &AnalyticsTracker {
        &self.inner.analytics
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }
}
