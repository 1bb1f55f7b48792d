//! Checkout orchestration.
//!
//! Drives a session's checkout through `idle -> validating -> processing ->
//! success | failed`. Only one checkout may be in flight per session; a
//! second submission while the first is processing is rejected rather than
//! queued. Confirmations are remembered by idempotency key so a retried
//! submit returns the original order instead of placing a new one.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_sessions::Session;
use tracing::instrument;

use jfk_cannabis_core::cart::Cart;
use jfk_cannabis_core::checkout::{
    self, CheckoutForm, CheckoutStatus, DeliveryMethod, PaymentMethod,
};
use jfk_cannabis_core::pricing::PriceSummary;

use crate::config::CheckoutConfig;
use crate::models::session_keys;
use crate::services::orders::{OrderError, OrderGateway, OrderRequest};

/// How long confirmations stay retrievable by idempotency key.
const IDEMPOTENCY_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Where the client goes after a successful order.
const CONFIRMATION_PATH: &str = "/order-confirmation";

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The form failed validation or the status machine refused a move.
    #[error(transparent)]
    Rejected(#[from] checkout::CheckoutError),

    /// Another checkout for this session is still processing.
    #[error("a checkout is already in progress for this session")]
    AlreadyInFlight,

    /// The order gateway did not answer in time.
    #[error("order placement timed out after {0:?}")]
    Timeout(Duration),

    /// The order gateway refused the order.
    #[error(transparent)]
    Gateway(#[from] OrderError),

    /// Reading or writing the session failed.
    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),
}

/// Returned to the client when an order is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderConfirmation {
    pub order_number: String,
    pub placed_at: DateTime<Utc>,
    pub summary: PriceSummary,
    pub delivery_method: DeliveryMethod,
    pub payment_method: PaymentMethod,
    pub item_count: u32,
    pub redirect_to: String,
}

/// Result of the simulated ID upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdVerification {
    pub id_verified: bool,
    pub verified_at: DateTime<Utc>,
}

/// Session keys currently processing a checkout.
#[derive(Debug, Clone, Default)]
struct InFlight(Arc<Mutex<HashSet<String>>>);

impl InFlight {
    fn acquire(&self, key: String) -> Option<InFlightGuard> {
        let mut held = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        held.insert(key.clone()).then(|| InFlightGuard {
            set: self.clone(),
            key,
        })
    }
}

/// Releases the session's in-flight slot when dropped.
struct InFlightGuard {
    set: InFlight,
    key: String,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.set
            .0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

/// Places orders for storefront sessions.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: OrderGateway,
    timeout: Duration,
    id_upload_latency: Duration,
    in_flight: InFlight,
    confirmations: Cache<String, OrderConfirmation>,
}

impl CheckoutService {
    #[must_use]
    pub fn new(config: &CheckoutConfig) -> Self {
        Self::with_gateway(OrderGateway::new(config.order_latency), config)
    }

    /// Use a specific gateway, keeping the other timings from `config`.
    #[must_use]
    pub fn with_gateway(gateway: OrderGateway, config: &CheckoutConfig) -> Self {
        Self {
            gateway,
            timeout: config.timeout,
            id_upload_latency: config.id_upload_latency,
            in_flight: InFlight::default(),
            confirmations: Cache::builder()
                .max_capacity(10_000)
                .time_to_live(IDEMPOTENCY_TTL)
                .build(),
        }
    }

    /// Simulate the ID upload and mark the session as verified.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Session` if the session cannot be written.
    #[instrument(skip(self, session))]
    pub async fn verify_id(&self, session: &Session) -> Result<IdVerification, CheckoutError> {
        tokio::time::sleep(self.id_upload_latency).await;
        session.insert(session_keys::ID_VERIFIED, true).await?;
        tracing::info!("ID verified");
        Ok(IdVerification {
            id_verified: true,
            verified_at: Utc::now(),
        })
    }

    /// Last recorded checkout status for the session.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::Session` if the session cannot be read.
    pub async fn status(&self, session: &Session) -> Result<CheckoutStatus, CheckoutError> {
        Ok(session
            .get::<CheckoutStatus>(session_keys::CHECKOUT_STATUS)
            .await?
            .unwrap_or_default())
    }

    /// Validate the form, place the order and clear the cart.
    ///
    /// # Errors
    ///
    /// - `CheckoutError::AlreadyInFlight` while another submission for the session is processing
    /// - `CheckoutError::Rejected` when validation fails, listing every issue
    /// - `CheckoutError::Timeout` when the gateway exceeds the configured timeout
    /// - `CheckoutError::Gateway` when the gateway refuses the order
    #[instrument(skip(self, session, form), fields(delivery_method = ?form.delivery_method))]
    pub async fn place_order(
        &self,
        session: &Session,
        form: CheckoutForm,
    ) -> Result<OrderConfirmation, CheckoutError> {
        let session_key = checkout_key(session).await?;
        let idempotency_key = form
            .idempotency_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(|key| format!("{session_key}:{key}"));

        if let Some(key) = &idempotency_key {
            if let Some(confirmation) = self.confirmations.get(key).await {
                tracing::info!(order_number = %confirmation.order_number, "Returning cached confirmation");
                return Ok(confirmation);
            }
        }

        let _guard = self
            .in_flight
            .acquire(session_key)
            .ok_or(CheckoutError::AlreadyInFlight)?;

        let mut status = CheckoutStatus::Idle.transition(CheckoutStatus::Validating)?;
        record_status(session, status).await?;

        let cart: Cart = session.get(session_keys::CART).await?.unwrap_or_default();
        let id_verified = session
            .get::<bool>(session_keys::ID_VERIFIED)
            .await?
            .unwrap_or(false);

        if let Err(e) = checkout::validate(&cart, &form, id_verified) {
            record_status(session, status.transition(CheckoutStatus::Failed)?).await?;
            tracing::info!(error = %e, "Checkout validation failed");
            return Err(e.into());
        }

        status = status.transition(CheckoutStatus::Processing)?;
        record_status(session, status).await?;

        let summary = checkout::quote(&cart, &form);
        let request = OrderRequest::new(&cart, &form, summary);

        let receipt = match tokio::time::timeout(self.timeout, self.gateway.submit(&request)).await
        {
            Ok(Ok(receipt)) => receipt,
            Ok(Err(e)) => {
                record_status(session, status.transition(CheckoutStatus::Failed)?).await?;
                tracing::warn!(error = %e, "Order gateway rejected order");
                return Err(e.into());
            }
            Err(_) => {
                record_status(session, status.transition(CheckoutStatus::Failed)?).await?;
                tracing::warn!(timeout = ?self.timeout, "Order gateway timed out");
                return Err(CheckoutError::Timeout(self.timeout));
            }
        };

        let confirmation = OrderConfirmation {
            redirect_to: format!("{CONFIRMATION_PATH}?order={}", receipt.order_number),
            order_number: receipt.order_number,
            placed_at: receipt.placed_at,
            summary,
            delivery_method: form.delivery_method,
            payment_method: form.payment_method,
            item_count: cart.item_count(),
        };

        session.remove::<Cart>(session_keys::CART).await?;
        session
            .insert(session_keys::LAST_ORDER, &confirmation)
            .await?;
        record_status(session, status.transition(CheckoutStatus::Success)?).await?;

        if let Some(key) = idempotency_key {
            self.confirmations.insert(key, confirmation.clone()).await;
        }

        Ok(confirmation)
    }
}

/// Stable key for the session's checkout bookkeeping.
///
/// Uses the session ID once the session has been persisted, otherwise a key
/// stored in the session itself.
async fn checkout_key(session: &Session) -> Result<String, CheckoutError> {
    if let Some(id) = session.id() {
        return Ok(id.to_string());
    }
    if let Some(key) = session.get::<String>(session_keys::CHECKOUT_KEY).await? {
        return Ok(key);
    }
    let key = uuid::Uuid::new_v4().to_string();
    session.insert(session_keys::CHECKOUT_KEY, &key).await?;
    Ok(key)
}

async fn record_status(session: &Session, status: CheckoutStatus) -> Result<(), CheckoutError> {
    session
        .insert(session_keys::CHECKOUT_STATUS, status)
        .await?;
    Ok(())
}
