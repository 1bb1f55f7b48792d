//! CLI command implementations.
//!
//! Each command returns the text to print so it can be tested without a
//! terminal.

pub mod catalog;
pub mod quote;

use thiserror::Error;

use jfk_cannabis_core::ProductId;
use jfk_cannabis_core::cart::CartError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The embedded catalog failed to load, or JSON output failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// No product with this ID.
    #[error("Product not found: {0}")]
    UnknownProduct(ProductId),

    /// An item argument did not parse.
    #[error("Invalid item '{0}'. Expected ID[xQTY][@WEIGHT], e.g. 3x2@7g")]
    InvalidItem(String),

    /// The cart rejected an item.
    #[error(transparent)]
    Cart(#[from] CartError),
}
