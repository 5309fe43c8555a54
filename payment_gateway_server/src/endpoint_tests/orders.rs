use actix_web::http::StatusCode;
use serde_json::json;

use super::helpers::{create_order, error_code, get, get_unauthenticated, post, post_raw, setup};

#[actix_web::test]
async fn create_order_returns_the_full_projection() {
    let gateway = setup(true).await;
    let (status, body) = post(
        &gateway,
        "/api/v1/orders",
        json!({ "amount": 500, "receipt": "rcpt-1", "notes": { "colour": "blue" } }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].as_str().unwrap().starts_with("order_"));
    assert_eq!(body["status"], "created");
    assert_eq!(body["amount"], 500);
    assert_eq!(body["currency"], "INR");
    assert_eq!(body["receipt"], "rcpt-1");
    assert_eq!(body["notes"], json!({ "colour": "blue" }));
}

#[actix_web::test]
async fn notes_default_to_an_empty_object() {
    let gateway = setup(true).await;
    let (status, body) = post(&gateway, "/api/v1/orders", json!({ "amount": 500 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["notes"], json!({}));
    assert_eq!(body["receipt"], json!(null));
}

#[actix_web::test]
async fn the_amount_floor_is_enforced() {
    let gateway = setup(true).await;
    let (status, body) = post(&gateway, "/api/v1/orders", json!({ "amount": 99 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "amount must be at least 100");

    let (status, body) = post(&gateway, "/api/v1/orders", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
}

#[actix_web::test]
async fn malformed_json_maps_to_a_bad_request() {
    let gateway = setup(true).await;
    let (status, body) = post_raw(&gateway, "/api/v1/orders", "{ this is not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
}

#[actix_web::test]
async fn unknown_orders_are_not_found() {
    let gateway = setup(true).await;
    let (status, body) = get(&gateway, "/api/v1/orders/order_doesnotexist00").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND_ERROR");
    assert_eq!(body["error"]["description"], "Order not found");
}

#[actix_web::test]
async fn order_listing_is_wrapped_and_newest_first() {
    let gateway = setup(true).await;
    let first = create_order(&gateway, 100).await;
    let second = create_order(&gateway, 200).await;
    let (status, body) = get(&gateway, "/api/v1/orders").await;
    assert_eq!(status, StatusCode::OK);
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert_eq!(orders[0]["id"], second.as_str());
    assert_eq!(orders[1]["id"], first.as_str());
}

#[actix_web::test]
async fn the_public_projection_is_reduced() {
    let gateway = setup(true).await;
    let (_, created) = post(
        &gateway,
        "/api/v1/orders",
        json!({ "amount": 500, "receipt": "rcpt-private", "notes": { "secret": true } }),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = get_unauthenticated(&gateway, &format!("/api/v1/orders/{id}/public")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["amount"], 500);
    assert_eq!(body["status"], "created");
    assert!(body.get("receipt").is_none());
    assert!(body.get("notes").is_none());
    assert!(body.get("updated_at").is_none());
}

#[actix_web::test]
async fn merchant_scoped_lookup_returns_everything() {
    let gateway = setup(true).await;
    let id = create_order(&gateway, 750).await;
    let (status, body) = get(&gateway, &format!("/api/v1/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.as_str());
    assert!(body.get("updated_at").is_some());
    assert!(body.get("created_at").is_some());
}
