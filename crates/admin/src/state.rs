//! Application state shared across handlers.

use std::sync::Arc;

use jfk_cannabis_core::catalog::Catalog;

use crate::alleaves::{PosError, PosService};
use crate::config::AdminConfig;
use crate::services::{AdminDirectory, AuthError, InventoryStore, StoreError};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("account directory: {0}")]
    Auth(#[from] AuthError),
    #[error("inventory store: {0}")]
    Store(#[from] StoreError),
    #[error("POS client: {0}")]
    Pos(#[from] PosError),
    #[error("invalid product catalog: {0}")]
    Catalog(#[from] serde_json::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    catalog: Catalog,
    directory: Arc<AdminDirectory>,
    inventory: InventoryStore,
    pos: PosService,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// Hashes the development account passwords, opens the inventory file
    /// when configured and picks the live or mock POS.
    ///
    /// # Errors
    ///
    /// Returns error if any of those steps fail.
    pub async fn new(config: AdminConfig) -> Result<Self, StateError> {
        let directory = AdminDirectory::development()?;
        let inventory = match &config.inventory_path {
            Some(path) => InventoryStore::open(path).await?,
            None => InventoryStore::in_memory(),
        };
        let pos = PosService::from_config(&config.alleaves)?;
        tracing::info!(pos = pos.backend().name(), "POS backend selected");

        Ok(Self::from_parts(
            config,
            Catalog::from_fixtures()?,
            directory,
            inventory,
            pos,
        ))
    }

    /// Assemble state from prebuilt parts.
    #[must_use]
    pub fn from_parts(
        config: AdminConfig,
        catalog: Catalog,
        directory: AdminDirectory,
        inventory: InventoryStore,
        pos: PosService,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                catalog,
                directory: Arc::new(directory),
                inventory,
                pos,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Account directory, shareable with blocking tasks.
    #[must_use]
    pub fn directory(&self) -> Arc<AdminDirectory> {
        Arc::clone(&self.inner.directory)
    }

    #[must_use]
    pub fn inventory(&self) -> &InventoryStore {
        &self.inner.inventory
    }

    #[must_use]
    pub fn pos(&self) -> &PosService {
        &self.inner.pos
    }
}
