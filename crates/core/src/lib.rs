//! JFK Cannabis Core - Shared domain library.
//!
//! This crate provides the domain model and pricing rules used by every
//! JFK Cannabis component:
//! - `storefront` - Public-facing dispensary site (catalog, cart, checkout)
//! - `admin` - Internal back office (inventory, POS sync)
//! - `cli` - Command-line catalog and quote tools
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients, no global state. Carts, catalogs and inventory ledgers are plain
//! values owned by whoever holds them.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, emails, money helpers, roles and permissions
//! - [`pricing`] - Tax table, delivery fee tiers, sale discounts
//! - [`catalog`] - Product records with filter, search and sort helpers
//! - [`cart`] - Cart line items and derived totals
//! - [`checkout`] - Checkout form validation and status transitions
//! - [`inventory`] - Inventory ledger merging POS and manual entries
//! - [`lab`] - Lab report data and entourage labels
//! - [`age`] - Legal age check for the age gate

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod age;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod inventory;
pub mod lab;
pub mod pricing;
pub mod types;

pub use types::*;
