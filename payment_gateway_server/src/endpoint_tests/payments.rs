use actix_web::http::StatusCode;
use serde_json::json;

use super::helpers::{
    create_order,
    error_code,
    get,
    get_unauthenticated,
    poll_payment_until_terminal,
    post,
    post_unauthenticated,
    setup,
};

fn upi_body(order_id: &str) -> serde_json::Value {
    json!({ "order_id": order_id, "method": "upi", "vpa": "alice@upi" })
}

fn card_body(order_id: &str) -> serde_json::Value {
    json!({
        "order_id": order_id,
        "method": "card",
        "card": {
            "number": "4111 1111 1111 1111",
            "expiry_month": "12",
            "expiry_year": "2099",
            "cvv": "123",
            "holder_name": "Alice Kumar"
        }
    })
}

#[actix_web::test]
async fn upi_payment_settles_to_success_and_pays_the_order() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;

    let (status, payment) = post(&gateway, "/api/v1/payments", upi_body(&order_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "processing");
    assert_eq!(payment["vpa"], "alice@upi");
    assert_eq!(payment["amount"], 500);
    assert!(payment["id"].as_str().unwrap().starts_with("pay_"));
    assert!(payment.get("card_network").is_none());
    assert!(payment.get("error_code").is_none());

    let settled = poll_payment_until_terminal(&gateway, payment["id"].as_str().unwrap()).await;
    assert_eq!(settled["status"], "success");
    assert!(settled.get("error_code").is_none());

    let (_, order) = get(&gateway, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(order["status"], "paid");
}

#[actix_web::test]
async fn declined_card_payment_exposes_the_error_fields() {
    let gateway = setup(false).await;
    let order_id = create_order(&gateway, 750).await;

    let (status, payment) = post(&gateway, "/api/v1/payments", card_body(&order_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["card_network"], "visa");
    assert_eq!(payment["card_last4"], "1111");
    assert!(payment.get("vpa").is_none());

    let settled = poll_payment_until_terminal(&gateway, payment["id"].as_str().unwrap()).await;
    assert_eq!(settled["status"], "failed");
    assert_eq!(settled["error_code"], "CARD_TRANSACTION_FAILED");
    assert_eq!(settled["error_description"], "Card transaction declined by bank.");
    assert_eq!(settled["card_network"], "visa");

    let (_, order) = get(&gateway, &format!("/api/v1/orders/{order_id}")).await;
    assert_eq!(order["status"], "created");
}

#[actix_web::test]
async fn an_invalid_vpa_maps_to_invalid_vpa() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let (status, body) = post(
        &gateway,
        "/api/v1/payments",
        json!({ "order_id": order_id, "method": "upi", "vpa": "alice.upi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_VPA");
    assert_eq!(
        body["error"]["description"],
        "Invalid VPA format. VPA must be in format: username@bank"
    );
}

#[actix_web::test]
async fn an_expired_card_maps_to_expired_card() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let mut body = card_body(&order_id);
    body["card"]["expiry_year"] = json!("2020");
    let (status, response) = post(&gateway, "/api/v1/payments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "EXPIRED_CARD");
    assert_eq!(response["error"]["description"], "Card has expired");
}

#[actix_web::test]
async fn a_tampered_card_number_maps_to_invalid_card() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let mut body = card_body(&order_id);
    body["card"]["number"] = json!("4111111111111112");
    let (status, response) = post(&gateway, "/api/v1/payments", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&response), "INVALID_CARD");
    assert_eq!(response["error"]["description"], "Invalid card number");
}

#[actix_web::test]
async fn an_unknown_method_is_a_bad_request() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let (status, body) = post(
        &gateway,
        "/api/v1/payments",
        json!({ "order_id": order_id, "method": "emi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "Invalid payment method. Must be \"upi\" or \"card\"");
}

#[actix_web::test]
async fn paying_an_already_paid_order_is_rejected() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let (_, payment) = post(&gateway, "/api/v1/payments", upi_body(&order_id)).await;
    poll_payment_until_terminal(&gateway, payment["id"].as_str().unwrap()).await;

    let (status, body) = post(&gateway, "/api/v1/payments", card_body(&order_id)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "Order has already been paid");
}

#[actix_web::test]
async fn payments_against_unknown_orders_are_not_found() {
    let gateway = setup(true).await;
    let (status, body) =
        post(&gateway, "/api/v1/payments", upi_body("order_doesnotexist00")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND_ERROR");
}

#[actix_web::test]
async fn the_public_path_needs_no_credentials() {
    let gateway = setup(true).await;
    let order_id = create_order(&gateway, 500).await;
    let (status, payment) =
        post_unauthenticated(&gateway, "/api/v1/payments/public", upi_body(&order_id)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(payment["status"], "processing");

    let payment_id = payment["id"].as_str().unwrap();
    let (status, fetched) =
        get_unauthenticated(&gateway, &format!("/api/v1/payments/{payment_id}/public")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["id"], payment_id);
}

#[actix_web::test]
async fn payment_listing_is_wrapped_and_newest_first() {
    let gateway = setup(false).await;
    let order_id = create_order(&gateway, 500).await;
    let (_, first) = post(&gateway, "/api/v1/payments", upi_body(&order_id)).await;
    poll_payment_until_terminal(&gateway, first["id"].as_str().unwrap()).await;
    let (_, second) = post(&gateway, "/api/v1/payments", upi_body(&order_id)).await;
    poll_payment_until_terminal(&gateway, second["id"].as_str().unwrap()).await;

    let (status, body) = get(&gateway, "/api/v1/payments").await;
    assert_eq!(status, StatusCode::OK);
    let payments = body["payments"].as_array().unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[0]["id"], second["id"]);
    assert_eq!(payments[1]["id"], first["id"]);
}

#[actix_web::test]
async fn merchant_stats_start_at_zero_and_track_success() {
    let gateway = setup(true).await;
    let (status, stats) = get(&gateway, "/api/v1/merchant/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats, json!({ "total_transactions": 0, "total_amount": 0, "success_rate": 0 }));

    let first = create_order(&gateway, 100).await;
    let second = create_order(&gateway, 200).await;
    let (_, p1) = post(&gateway, "/api/v1/payments", upi_body(&first)).await;
    let (_, p2) = post(&gateway, "/api/v1/payments", card_body(&second)).await;
    poll_payment_until_terminal(&gateway, p1["id"].as_str().unwrap()).await;
    let settled_card = poll_payment_until_terminal(&gateway, p2["id"].as_str().unwrap()).await;
    // Card fields survive into the successful projection; error fields never appear.
    assert_eq!(settled_card["status"], "success");
    assert_eq!(settled_card["card_network"], "visa");
    assert_eq!(settled_card["card_last4"], "1111");
    assert!(settled_card.get("vpa").is_none());
    assert!(settled_card.get("error_code").is_none());

    let (_, stats) = get(&gateway, "/api/v1/merchant/stats").await;
    assert_eq!(stats, json!({ "total_transactions": 2, "total_amount": 300, "success_rate": 100 }));
}
