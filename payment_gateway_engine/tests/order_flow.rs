mod support;

use payment_gateway_engine::{
    db_types::{MerchantId, OrderStatusType},
    order_objects::NewOrderRequest,
    OrderApi,
    OrderApiError,
};
use pgw_common::Money;

fn order_request(amount: i64) -> NewOrderRequest {
    NewOrderRequest { amount: Some(Money::from(amount)), currency: None, receipt: None, notes: None }
}

#[tokio::test]
async fn orders_are_created_with_unique_prefixed_ids() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let api = OrderApi::new(db);
    let first = api.create_order(&merchant.id, order_request(500)).await.unwrap();
    let second = api.create_order(&merchant.id, order_request(750)).await.unwrap();
    assert_eq!(first.status, OrderStatusType::Created);
    assert_eq!(first.currency, "INR");
    assert!(first.id.as_str().starts_with("order_"));
    assert_eq!(first.id.as_str().len(), "order_".len() + 16);
    assert_ne!(first.id, second.id);
}

#[tokio::test]
async fn amounts_below_the_floor_are_rejected() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let api = OrderApi::new(db);
    let err = api.create_order(&merchant.id, order_request(99)).await.unwrap_err();
    assert!(matches!(err, OrderApiError::AmountBelowMinimum));

    let omitted = NewOrderRequest { amount: None, currency: None, receipt: None, notes: None };
    let err = api.create_order(&merchant.id, omitted).await.unwrap_err();
    assert!(matches!(err, OrderApiError::AmountBelowMinimum));

    // The floor itself is accepted.
    assert!(api.create_order(&merchant.id, order_request(100)).await.is_ok());
}

#[tokio::test]
async fn receipt_notes_and_currency_round_trip() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let api = OrderApi::new(db);
    let request = NewOrderRequest {
        amount: Some(Money::from(2_500)),
        currency: Some("USD".to_string()),
        receipt: Some("rcpt-42".to_string()),
        notes: Some(serde_json::json!({"colour": "blue", "size": 7})),
    };
    let order = api.create_order(&merchant.id, request).await.unwrap();
    let fetched = api.fetch_order(&order.id).await.unwrap();
    assert_eq!(fetched.amount, Money::from(2_500));
    assert_eq!(fetched.currency, "USD");
    assert_eq!(fetched.receipt.as_deref(), Some("rcpt-42"));
    assert_eq!(fetched.notes, Some(serde_json::json!({"colour": "blue", "size": 7})));
}

#[tokio::test]
async fn orders_are_scoped_to_their_merchant() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let api = OrderApi::new(db);
    let order = api.create_order(&merchant.id, order_request(500)).await.unwrap();

    let stranger = MerchantId("mer_someoneelse0001".to_string());
    let err = api.fetch_order_for_merchant(&order.id, &stranger).await.unwrap_err();
    assert!(matches!(err, OrderApiError::OrderNotFound));

    // The public path skips the ownership check but still requires existence.
    assert!(api.fetch_order(&order.id).await.is_ok());
    let missing = "order_doesnotexist00".parse().unwrap();
    assert!(matches!(api.fetch_order(&missing).await.unwrap_err(), OrderApiError::OrderNotFound));
}

#[tokio::test]
async fn order_listing_is_newest_first() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let api = OrderApi::new(db);
    let first = api.create_order(&merchant.id, order_request(100)).await.unwrap();
    let second = api.create_order(&merchant.id, order_request(200)).await.unwrap();
    let third = api.create_order(&merchant.id, order_request(300)).await.unwrap();
    let orders = api.orders_for_merchant(&merchant.id).await.unwrap();
    let ids: Vec<_> = orders.iter().map(|o| o.id.clone()).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);
}
