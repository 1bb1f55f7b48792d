//! Cart analytics tracking.
//!
//! Cart mutations are reported to an external collector. Tracking is
//! fire-and-forget: each event is posted from a detached task, and failures
//! are logged at debug level and otherwise ignored. Without a configured
//! endpoint events are only logged.

use chrono::{DateTime, Utc};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::Serialize;
use thiserror::Error;
use url::Url;

use jfk_cannabis_core::cart::CartEvent;

use crate::config::AnalyticsConfig;

/// Errors that can occur when sending an analytics event.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Collector returned a non-success status.
    #[error("API error: {status}")]
    Api { status: u16 },

    /// Write key is not a valid header value.
    #[error("Invalid write key: {0}")]
    InvalidKey(String),
}

/// Payload posted to the collector.
#[derive(Debug, Clone, Serialize)]
pub struct AnalyticsPayload {
    pub name: &'static str,
    pub session_id: Option<String>,
    pub sent_at: DateTime<Utc>,
    #[serde(flatten)]
    pub event: CartEvent,
}

/// Analytics client for cart events.
#[derive(Clone)]
pub struct AnalyticsTracker {
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl AnalyticsTracker {
    /// Create a tracker from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the write key is malformed or the HTTP client fails to build.
    pub fn new(config: &AnalyticsConfig) -> Result<Self, AnalyticsError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = &config.write_key {
            let value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|e| AnalyticsError::InvalidKey(e.to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(5))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    /// Whether events leave the process.
    #[must_use]
    pub const fn is_enabled(&self) -> bool {
        self.endpoint.is_some()
    }

    /// Report a cart event without waiting for the result.
    pub fn track(&self, event: CartEvent, session_id: Option<String>) {
        let payload = AnalyticsPayload {
            name: event.name(),
            session_id,
            sent_at: Utc::now(),
            event,
        };
        tracing::debug!(event = payload.name, "Cart event");

        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };
        let client = self.client.clone();
        tokio::spawn(async move {
            if let Err(e) = send(&client, endpoint, &payload).await {
                tracing::debug!(event = payload.name, error = %e, "Analytics event dropped");
            }
        });
    }
}

async fn send(
    client: &reqwest::Client,
    endpoint: Url,
    payload: &AnalyticsPayload,
) -> Result<(), AnalyticsError> {
    let response = client.post(endpoint).json(payload).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(AnalyticsError::Api {
            status: status.as_u16(),
        });
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use jfk_cannabis_core::ProductId;
    use rust_decimal_macros::dec;
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn test_payload_flattens_event() {
        let event = CartEvent::ItemAdded {
            product_id: ProductId::new(3),
            line_id: "3:-:-".to_string(),
            quantity: 2,
            unit_price: dec!(55),
        };
        let payload = AnalyticsPayload {
            name: event.name(),
            session_id: Some("abc".to_string()),
            sent_at: Utc::now(),
            event,
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["name"], "add_to_cart");
        assert_eq!(json["event"], "item_added");
        assert_eq!(json["product_id"], 3);
        assert_eq!(json["unit_price"], "55");
    }

    #[test]
    fn test_tracker_without_endpoint_is_disabled() {
        let tracker = AnalyticsTracker::new(&AnalyticsConfig::default()).unwrap();
        assert!(!tracker.is_enabled());
        // No runtime needed: nothing is spawned without an endpoint.
        tracker.track(CartEvent::Cleared { lines: 0 }, None);
    }

    #[test]
    fn test_invalid_write_key_rejected() {
        let config = AnalyticsConfig {
            endpoint: None,
            write_key: Some(SecretString::from("bad\nkey")),
        };
        assert!(matches!(
            AnalyticsTracker::new(&config),
            Err(AnalyticsError::InvalidKey(_))
        ));
    }
}
