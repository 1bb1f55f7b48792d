//! Integration tests for JFK Cannabis.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p jfk-cannabis-integration-tests
//! ```
//!
//! Both services are driven in-process through their routers with
//! `tower::ServiceExt::oneshot`; no server or network is needed. The
//! admin tests run against the mock Alleaves POS.
//!
//! # Test Categories
//!
//! - `storefront` - Age gate, catalog, cart and checkout flows
//! - `admin` - Login, permissions, inventory and POS sync

use std::str::FromStr;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use jfk_cannabis_admin::config::AdminConfig;
use jfk_cannabis_storefront::config::StorefrontConfig;

/// Largest response body the helpers will read.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// A response with its body parsed as JSON (`Value::Null` when empty or not JSON).
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestResponse {
    /// Read a decimal field that is serialized as a string.
    ///
    /// # Panics
    ///
    /// Panics if the field is missing or not a decimal string.
    #[must_use]
    pub fn decimal(&self, field: &str) -> Decimal {
        let raw = self.body[field]
            .as_str()
            .unwrap_or_else(|| panic!("{field} missing in {}", self.body));
        Decimal::from_str(raw).unwrap_or_else(|e| panic!("{field}={raw}: {e}"))
    }
}

/// In-process client that carries one session cookie between requests.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    #[must_use]
    pub const fn new(app: Router) -> Self {
        Self { app, cookie: None }
    }

    /// A second visitor on the same app (shared session store, no cookie).
    #[must_use]
    pub fn fresh_session(&self) -> Self {
        Self::new(self.app.clone())
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, None).await
    }

    pub async fn post(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&mut self, uri: &str, body: Value) -> TestResponse {
        self.send(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&mut self, uri: &str) -> TestResponse {
        self.send(Method::DELETE, uri, None).await
    }

    /// Send a request, keeping any session cookie the response sets.
    ///
    /// # Panics
    ///
    /// Panics if the request cannot be built or the body cannot be read.
    pub async fn send(&mut self, method: Method, uri: &str, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("Router is infallible");

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
        {
            self.cookie = set_cookie.split(';').next().map(str::to_string);
        }

        let status = response.status();
        let bytes = to_bytes(response.into_body(), MAX_BODY_BYTES)
            .await
            .expect("Failed to read response body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        TestResponse { status, body }
    }
}

/// Storefront router with test configuration and the fixture catalog.
///
/// # Panics
///
/// Panics if the state cannot be built.
#[must_use]
pub fn storefront() -> TestClient {
    let state = jfk_cannabis_storefront::state::AppState::new(StorefrontConfig::for_tests())
        .expect("Failed to create storefront state");
    TestClient::new(jfk_cannabis_storefront::app(state))
}

/// Storefront client that has already passed the age gate.
pub async fn verified_storefront() -> TestClient {
    let mut client = storefront();
    let response = client
        .post(
            "/api/age-gate",
            serde_json::json!({ "birth_date": "1990-01-01" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    client
}

/// Admin router with test configuration and the mock POS.
///
/// # Panics
///
/// Panics if the state cannot be built.
pub async fn admin() -> TestClient {
    let state = jfk_cannabis_admin::state::AppState::new(AdminConfig::for_tests())
        .await
        .expect("Failed to create admin state");
    TestClient::new(jfk_cannabis_admin::app(state))
}

/// Admin client logged in as `email`.
pub async fn admin_as(email: &str, password: &str) -> TestClient {
    let mut client = admin().await;
    let response = client
        .post(
            "/auth/login",
            serde_json::json!({ "email": email, "password": password }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    client
}
