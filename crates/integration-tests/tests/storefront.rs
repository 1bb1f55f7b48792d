//! Router-level tests for the storefront API.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal_macros::dec;
use serde_json::json;

use jfk_cannabis_integration_tests::{storefront, verified_storefront};

#[tokio::test]
async fn test_health() {
    let mut client = storefront();
    let response = client.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
}

// ============================================================================
// Age gate
// ============================================================================

#[tokio::test]
async fn test_cart_requires_age_gate() {
    let mut client = storefront();
    let response = client.get("/api/cart").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["age_gate"], "/api/age-gate");

    let response = client.post("/api/cart/add", json!({ "product_id": 3 })).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_underage_visitor_is_turned_away() {
    let mut client = storefront();
    let response = client
        .post("/api/age-gate", json!({ "birth_date": "2015-06-01" }))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = client.get("/api/age-gate").await;
    assert_eq!(response.body["verified"], false);

    let response = client.get("/api/cart").await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_age_gate_pass_is_per_session() {
    let mut client = verified_storefront().await;
    assert_eq!(client.get("/api/age-gate").await.body["verified"], true);
    assert_eq!(client.get("/api/cart").await.status, StatusCode::OK);

    let mut stranger = client.fresh_session();
    assert_eq!(stranger.get("/api/cart").await.status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Catalog
// ============================================================================

#[tokio::test]
async fn test_catalog_is_public() {
    let mut client = storefront();
    let response = client.get("/api/products").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 16);
}

#[tokio::test]
async fn test_sale_products_are_discounted() {
    let mut client = storefront();
    let response = client.get("/api/products/sale").await;
    assert_eq!(response.status, StatusCode::OK);

    let products = response.body["products"].as_array().unwrap();
    assert!(!products.is_empty());
    for product in products {
        assert_eq!(product["on_sale"], true, "{product}");
        // Midnight Berry has sale_price == price
        assert_ne!(product["id"], 9);
    }
}

#[tokio::test]
async fn test_category_listing_and_unknown_category() {
    let mut client = storefront();
    let response = client.get("/api/categories/vapes").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["total"], 2);

    let response = client.get("/api/categories/pipes").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_product_detail() {
    let mut client = storefront();
    let response = client.get("/api/products/1").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["name"], "Gelato Cake");
    assert!(response.body["lab"].is_object());

    let response = client.get("/api/products/999").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_filtered_listing() {
    let mut client = storefront();
    let response = client
        .get("/api/products?category=flower&sort=price_asc")
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let ids = response.body["products"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect::<Vec<_>>();
    // Gelato Cake 38 (sale), Northern Lights 40, Jack Herer 42, Blue Dream 55
    assert_eq!(ids, vec![1, 2, 15, 3]);
}

// ============================================================================
// Cart
// ============================================================================

#[tokio::test]
async fn test_single_item_cart_totals() {
    let mut client = verified_storefront().await;
    let response = client.post("/api/cart/add", json!({ "product_id": 3 })).await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);

    assert_eq!(response.decimal("subtotal"), dec!(55));
    assert_eq!(response.decimal("delivery_fee"), dec!(5));
    assert_eq!(response.decimal("tax"), dec!(7.15));
    assert_eq!(response.decimal("total"), dec!(67.15));
    assert_eq!(response.body["checkout_available"], true);
}

#[tokio::test]
async fn test_same_item_merges_into_one_line() {
    let mut client = verified_storefront().await;
    client
        .post("/api/cart/add", json!({ "product_id": 3, "weight": "7g" }))
        .await;
    let response = client
        .post("/api/cart/add", json!({ "product_id": 3, "weight": "7g" }))
        .await;

    let items = response.body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["quantity"], 2);
    assert_eq!(client.get("/api/cart/count").await.body["count"], 2);

    // A different weight is a separate line
    let response = client
        .post("/api/cart/add", json!({ "product_id": 3, "weight": "3.5g" }))
        .await;
    assert_eq!(response.body["items"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_update_clamps_and_remove_empties() {
    let mut client = verified_storefront().await;
    let response = client
        .post("/api/cart/add", json!({ "product_id": 8, "quantity": 3 }))
        .await;
    let line_id = response.body["items"][0]["line_id"]
        .as_str()
        .unwrap()
        .to_string();

    let response = client
        .post(
            "/api/cart/update",
            json!({ "line_id": line_id, "quantity": 0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["items"][0]["quantity"], 1);

    let response = client
        .post("/api/cart/remove", json!({ "line_id": line_id }))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["is_empty"], true);
    assert_eq!(response.body["checkout_available"], false);

    let response = client
        .post("/api/cart/remove", json!({ "line_id": line_id }))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_rejections() {
    let mut client = verified_storefront().await;

    let response = client.post("/api/cart/add", json!({ "product_id": 5 })).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = client.post("/api/cart/add", json!({ "product_id": 999 })).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let response = client
        .post("/api/cart/add", json!({ "product_id": 3, "weight": "1oz" }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_destination_changes_tax_and_fee() {
    let mut client = verified_storefront().await;
    client.post("/api/cart/add", json!({ "product_id": 3 })).await;

    let response = client
        .put(
            "/api/cart/destination",
            json!({ "state": "nj", "distance_miles": 12.0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["destination"]["state"], "NJ");
    assert_eq!(response.decimal("delivery_fee"), dec!(12));
    assert_eq!(response.decimal("tax"), dec!(3.64));

    let response = client
        .put(
            "/api/cart/destination",
            json!({ "state": "New York", "distance_miles": 1.0 }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

// ============================================================================
// Checkout
// ============================================================================

#[tokio::test]
async fn test_empty_cart_cannot_check_out() {
    let mut client = verified_storefront().await;
    let cart = client.get("/api/cart").await;
    assert_eq!(cart.body["is_empty"], true);
    assert_eq!(cart.body["checkout_available"], false);

    let response = client
        .post(
            "/api/checkout",
            json!({ "delivery_method": "pickup", "terms_accepted": true }),
        )
        .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    let codes = response.body["issues"]
        .as_array()
        .unwrap()
        .iter()
        .map(|issue| issue["code"].as_str().unwrap().to_string())
        .collect::<Vec<_>>();
    assert!(codes.contains(&"empty_cart".to_string()));
    assert!(codes.contains(&"id_not_verified".to_string()));

    assert_eq!(
        client.get("/api/checkout/status").await.body["status"],
        "failed"
    );
}

#[tokio::test]
async fn test_id_upload_requires_document_type() {
    let mut client = verified_storefront().await;
    let response = client
        .post("/api/checkout/id-upload", json!({ "document_type": "  " }))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkout_success_clears_cart() {
    let mut client = verified_storefront().await;
    client
        .post("/api/cart/add", json!({ "product_id": 3, "quantity": 2 }))
        .await;

    let response = client
        .post(
            "/api/checkout/id-upload",
            json!({ "document_type": "drivers_license", "file_name": "license.jpg" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert_eq!(response.body["id_verified"], true);

    let response = client
        .post(
            "/api/checkout",
            json!({
                "delivery_method": "delivery",
                "address": "1 JFK Expressway, Queens, NY",
                "terms_accepted": true,
                "payment_method": "cash",
                "idempotency_key": "order-1",
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let order_number = response.body["order_number"].as_str().unwrap().to_string();
    assert!(order_number.starts_with("JFK-"));
    assert_eq!(response.body["item_count"], 2);
    assert_eq!(response.body["summary"]["delivery_fee"], "0");

    let cart = client.get("/api/cart").await;
    assert_eq!(cart.body["is_empty"], true);
    assert_eq!(
        client.get("/api/checkout/status").await.body["status"],
        "success"
    );

    // Retrying with the same key returns the original order
    let retry = client
        .post(
            "/api/checkout",
            json!({
                "delivery_method": "delivery",
                "address": "1 JFK Expressway, Queens, NY",
                "terms_accepted": true,
                "idempotency_key": "order-1",
            }),
        )
        .await;
    assert_eq!(retry.status, StatusCode::OK);
    assert_eq!(retry.body["order_number"], order_number.as_str());
}

#[tokio::test]
async fn test_quote_waives_delivery_for_pickup() {
    let mut client = verified_storefront().await;
    client.post("/api/cart/add", json!({ "product_id": 3 })).await;

    let delivery = client.get("/api/checkout/quote").await;
    assert_eq!(delivery.decimal("total"), dec!(67.15));

    let pickup = client
        .get("/api/checkout/quote?delivery_method=pickup")
        .await;
    assert_eq!(pickup.decimal("delivery_fee"), dec!(0));
    assert_eq!(pickup.decimal("total"), dec!(62.15));
}
