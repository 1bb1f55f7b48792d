//! Router-level tests for the admin API against the mock POS.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use serde_json::json;

use jfk_cannabis_admin::alleaves::PosService;
use jfk_cannabis_admin::config::AdminConfig;
use jfk_cannabis_admin::models::AdminUser;
use jfk_cannabis_admin::services::{AdminDirectory, InventoryStore};
use jfk_cannabis_admin::state::AppState;
use jfk_cannabis_core::catalog::Catalog;
use jfk_cannabis_core::{AdminUserId, Email, Role};
use jfk_cannabis_integration_tests::{TestClient, admin, admin_as};

const ADMIN_EMAIL: &str = "admin@jfkcannabis.com";
const ADMIN_PASSWORD: &str = "admin123";

/// Admin app whose only account is a staff member.
async fn staff_client() -> TestClient {
    let config = AdminConfig::for_tests();
    let staff = AdminUser {
        id: AdminUserId::new(7),
        email: Email::parse("staff@jfkcannabis.com").unwrap(),
        name: "Floor Staff".to_string(),
        role: Role::Staff,
    };
    let state = AppState::from_parts(
        config.clone(),
        Catalog::from_fixtures().unwrap(),
        AdminDirectory::from_accounts([(staff, "staff123")]).unwrap(),
        InventoryStore::in_memory(),
        PosService::from_config(&config.alleaves).unwrap(),
    );

    let mut client = TestClient::new(jfk_cannabis_admin::app(state));
    let response = client
        .post(
            "/auth/login",
            json!({ "email": "staff@jfkcannabis.com", "password": "staff123" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    client
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_login_success() {
    let mut client = admin().await;
    let response = client
        .post(
            "/auth/login",
            json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["is_authenticated"], true);
    assert_eq!(response.body["user"]["role"], "admin");
    assert!(response.body["token"].as_str().is_some_and(|t| !t.is_empty()));

    let me = client.get("/auth/me").await;
    assert_eq!(me.body["is_authenticated"], true);
    assert_eq!(me.body["user"]["email"], ADMIN_EMAIL);
    assert!(me.body.get("token").is_none());
}

#[tokio::test]
async fn test_login_is_case_insensitive_on_email() {
    let mut client = admin().await;
    let response = client
        .post(
            "/auth/login",
            json!({ "email": "Manager@JFKCannabis.com", "password": "manager123" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["user"]["role"], "manager");
}

#[tokio::test]
async fn test_login_failures_share_one_message() {
    let mut client = admin().await;
    let attempts = [
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
        json!({ "email": "nobody@jfkcannabis.com", "password": ADMIN_PASSWORD }),
        json!({ "email": ADMIN_EMAIL, "password": "manager123" }),
    ];

    for attempt in attempts {
        let response = client.post("/auth/login", attempt).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert_eq!(response.body["error"], "Invalid email or password");
    }

    let me = client.get("/auth/me").await;
    assert_eq!(me.body["is_authenticated"], false);
}

#[tokio::test]
async fn test_logout_ends_session() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = client.post("/auth/logout", json!({})).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_authenticated"], false);

    let response = client.get("/api/inventory").await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Permissions
// ============================================================================

#[tokio::test]
async fn test_api_requires_login() {
    let mut client = admin().await;
    for uri in ["/api/products", "/api/inventory", "/api/pos/products"] {
        let response = client.get(uri).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{uri}");
    }
    let response = client.post("/api/pos/sync", json!({})).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_staff_can_view_but_not_change() {
    let mut client = staff_client().await;
    assert_eq!(client.get("/api/inventory").await.status, StatusCode::OK);
    assert_eq!(client.get("/api/products").await.status, StatusCode::OK);

    let response = client
        .post(
            "/api/inventory",
            json!({ "product_id": 3, "quantity": 5, "location": "Back Room" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = client.post("/api/pos/sync", json!({})).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Inventory & POS
// ============================================================================

#[tokio::test]
async fn test_sync_merges_pos_inventory() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    assert_eq!(client.get("/api/inventory").await.body["total"], 0);

    let response = client.post("/api/pos/sync", json!({})).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["backend"], "mock");
    assert_eq!(response.body["synced"], 7);

    let response = client
        .post(
            "/api/inventory",
            json!({ "product_id": 3, "quantity": 5, "location": "Back Room" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    assert_eq!(response.body["id"], "manual-1");
    assert_eq!(response.body["source"], "manual");

    let inventory = client.get("/api/inventory").await;
    assert_eq!(inventory.body["total"], 8);

    let manual_only = client.get("/api/inventory?source=manual").await;
    assert_eq!(manual_only.body["total"], 1);

    // A second sync replaces POS rows and keeps manual ones
    client.post("/api/pos/sync", json!({})).await;
    assert_eq!(client.get("/api/inventory").await.body["total"], 8);

    // Blue Dream: 30 from the POS + 5 manual
    let products = client.get("/api/products?category=flower").await;
    let blue_dream = products.body["products"]
        .as_array()
        .unwrap()
        .iter()
        .find(|p| p["id"] == 3)
        .unwrap()
        .clone();
    assert_eq!(blue_dream["on_hand"], 35);
}

#[tokio::test]
async fn test_manual_entry_lifecycle() {
    let mut client = admin_as("manager@jfkcannabis.com", "manager123").await;

    let response = client
        .post(
            "/api/inventory",
            json!({ "product_id": 14, "quantity": 12, "location": "Display Case" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["id"].as_str().unwrap().to_string();

    let response = client
        .put(&format!("/api/inventory/{id}"), json!({ "quantity": 4 }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["quantity"], 4);

    let low = client.get("/api/inventory/low-stock").await;
    assert_eq!(low.body["total"], 1);
    let low = client.get("/api/inventory/low-stock?threshold=3").await;
    assert_eq!(low.body["total"], 0);

    let response = client.delete(&format!("/api/inventory/{id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = client.delete(&format!("/api/inventory/{id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_manual_entry_validation() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;

    let response = client
        .post(
            "/api/inventory",
            json!({ "product_id": 999, "quantity": 1, "location": "Back Room" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = client
        .post(
            "/api/inventory",
            json!({ "product_id": 3, "quantity": 1, "location": "   " }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pos_items_update_through_pos_and_cannot_be_deleted() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    client.post("/api/pos/sync", json!({})).await;

    let response = client
        .put("/api/inventory/alleaves-inv-1003", json!({ "quantity": 12 }))
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["quantity"], 12);

    // The POS kept the change, so a fresh sync agrees
    client.post("/api/pos/sync", json!({})).await;
    let inventory = client.get("/api/inventory?product_id=3").await;
    assert_eq!(inventory.body["items"][0]["quantity"], 12);

    let response = client.delete("/api/inventory/alleaves-inv-1003").await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_reports_after_sync() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    client.post("/api/pos/sync", json!({})).await;

    // Pineapple Express (6) and Live Rosin (3) are at or below 10
    let low = client.get("/api/inventory/low-stock").await;
    assert_eq!(low.status, StatusCode::OK);
    assert_eq!(low.body["total"], 2);

    // Watermelon Gummies expire in 20 days
    let expiring = client.get("/api/inventory/expiring?days=30").await;
    assert_eq!(expiring.body["total"], 1);
    assert_eq!(expiring.body["items"][0]["product_id"], 8);
}

#[tokio::test]
async fn test_expiring_window_past_calendar_range_is_rejected() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = client.get("/api/inventory/expiring?days=4000000000").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // The service keeps answering afterwards.
    let response = client.get("/api/inventory/expiring").await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_pos_products() {
    let mut client = admin_as(ADMIN_EMAIL, ADMIN_PASSWORD).await;
    let response = client.get("/api/pos/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body.as_array().unwrap().len(), 7);

    let response = client.get("/api/pos/products/alv-003").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Blue Dream");

    let response = client.get("/api/pos/products/alv-999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
