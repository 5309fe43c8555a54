mod support;

use std::time::Duration;

use payment_gateway_engine::{
    db_types::{
        CardNetwork,
        MerchantId,
        OrderId,
        OrderStatusType,
        Payment,
        PaymentId,
        PaymentMethod,
        PaymentStatusType,
    },
    order_objects::NewOrderRequest,
    payment_objects::NewPaymentRequest,
    settlement::{run_settlement_worker, SettlementConfig, SettlementQueue},
    validation::{CardDetails, ValidationError},
    OrderApi,
    PaymentApiError,
    PaymentFlowApi,
    SqliteDatabase,
};
use pgw_common::Money;

const SETTLE_DELAY: Duration = Duration::from_millis(25);

fn order_request(amount: i64) -> NewOrderRequest {
    NewOrderRequest { amount: Some(Money::from(amount)), currency: None, receipt: None, notes: None }
}

fn upi_request(order_id: &OrderId) -> NewPaymentRequest {
    NewPaymentRequest {
        order_id: order_id.clone(),
        method: "upi".to_string(),
        vpa: Some("alice@upi".to_string()),
        card: None,
    }
}

fn card_request(order_id: &OrderId) -> NewPaymentRequest {
    NewPaymentRequest {
        order_id: order_id.clone(),
        method: "card".to_string(),
        vpa: None,
        card: Some(CardDetails {
            number: "4111 1111 1111 1111".to_string(),
            expiry_month: "12".to_string(),
            expiry_year: "2099".to_string(),
            cvv: "123".to_string(),
            holder_name: "Alice Kumar".to_string(),
        }),
    }
}

/// Builds a payment API wired to a running settlement worker with the given forced outcome.
fn payment_api(db: &SqliteDatabase, outcome: bool) -> PaymentFlowApi<SqliteDatabase> {
    let (queue, jobs) = SettlementQueue::new(16);
    let config = SettlementConfig::deterministic(SETTLE_DELAY, outcome);
    tokio::spawn(run_settlement_worker(db.clone(), config, jobs));
    PaymentFlowApi::new(db.clone(), queue)
}

/// Polls the store until the payment leaves `processing`, well past the deterministic delay.
async fn await_terminal(api: &PaymentFlowApi<SqliteDatabase>, id: &PaymentId) -> Payment {
    for _ in 0..200 {
        let payment = api.fetch_payment(id).await.unwrap();
        if payment.status != PaymentStatusType::Processing {
            return payment;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Payment {id} never reached a terminal state");
}

#[tokio::test]
async fn successful_upi_payment_settles_and_marks_the_order_paid() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, true);

    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();
    let payment = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    assert_eq!(payment.status, PaymentStatusType::Processing);
    assert_eq!(payment.method, PaymentMethod::Upi);
    assert_eq!(payment.amount, Money::from(500));
    assert_eq!(payment.vpa.as_deref(), Some("alice@upi"));
    assert!(payment.id.as_str().starts_with("pay_"));

    let settled = await_terminal(&payments, &payment.id).await;
    assert_eq!(settled.status, PaymentStatusType::Success);
    assert!(settled.error_code.is_none());

    let order = orders.fetch_order(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Paid);
}

#[tokio::test]
async fn declined_card_payment_records_the_error_and_leaves_the_order_unpaid() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, false);

    let order = orders.create_order(&merchant.id, order_request(750)).await.unwrap();
    let payment = payments.create_payment(Some(&merchant.id), card_request(&order.id)).await.unwrap();
    assert_eq!(payment.card_network, Some(CardNetwork::Visa));
    assert_eq!(payment.card_last4.as_deref(), Some("1111"));
    assert!(payment.vpa.is_none());

    let settled = await_terminal(&payments, &payment.id).await;
    assert_eq!(settled.status, PaymentStatusType::Failed);
    assert_eq!(settled.error_code.as_deref(), Some("CARD_TRANSACTION_FAILED"));
    assert_eq!(settled.error_description.as_deref(), Some("Card transaction declined by bank."));

    let order = orders.fetch_order(&order.id).await.unwrap();
    assert_eq!(order.status, OrderStatusType::Created);
}

#[tokio::test]
async fn declined_upi_payment_uses_the_upi_error_code() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, false);

    let order = orders.create_order(&merchant.id, order_request(300)).await.unwrap();
    let payment = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    let settled = await_terminal(&payments, &payment.id).await;
    assert_eq!(settled.error_code.as_deref(), Some("UPI_TRANSACTION_FAILED"));
}

#[tokio::test]
async fn a_paid_order_rejects_further_payment_attempts() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, true);

    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();
    let payment = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    await_terminal(&payments, &payment.id).await;

    let err = payments.create_payment(Some(&merchant.id), card_request(&order.id)).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::OrderAlreadyPaid));
    // The rejection happened before any payment row was written.
    assert_eq!(payments.payments_for_merchant(&merchant.id).await.unwrap().len(), 1);
}

#[tokio::test]
async fn multiple_failed_attempts_against_an_order_are_allowed() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, false);

    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();
    let first = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    await_terminal(&payments, &first.id).await;
    let second = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    await_terminal(&payments, &second.id).await;
    assert_eq!(payments.payments_for_merchant(&merchant.id).await.unwrap().len(), 2);
}

#[tokio::test]
async fn invalid_method_details_leave_no_payment_row() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, true);
    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();

    let mut bad_vpa = upi_request(&order.id);
    bad_vpa.vpa = Some("alice.upi".to_string());
    let err = payments.create_payment(Some(&merchant.id), bad_vpa).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::Validation(ValidationError::InvalidVpa(_))));

    let mut no_vpa = upi_request(&order.id);
    no_vpa.vpa = None;
    let err = payments.create_payment(Some(&merchant.id), no_vpa).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::Validation(ValidationError::InvalidVpa(_))));

    let mut bad_method = upi_request(&order.id);
    bad_method.method = "emi".to_string();
    let err = payments.create_payment(Some(&merchant.id), bad_method).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::UnsupportedMethod));

    assert!(payments.payments_for_merchant(&merchant.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn payments_are_scoped_to_the_owning_merchant() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, true);
    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();

    let stranger = MerchantId("mer_someoneelse0001".to_string());
    let err = payments.create_payment(Some(&stranger), upi_request(&order.id)).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::OrderNotFound));

    // The public path has no ownership gate; the merchant is taken from the order.
    let payment = payments.create_payment(None, upi_request(&order.id)).await.unwrap();
    assert_eq!(payment.merchant_id, merchant.id);

    let err = payments.fetch_payment_for_merchant(&payment.id, &stranger).await.unwrap_err();
    assert!(matches!(err, PaymentApiError::PaymentNotFound));
    assert!(payments.fetch_payment(&payment.id).await.is_ok());
}

#[tokio::test]
async fn merchant_stats_aggregate_counts_sums_and_rate() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let succeeding = payment_api(&db, true);
    let failing = payment_api(&db, false);

    let empty = succeeding.merchant_stats(&merchant.id).await.unwrap();
    assert_eq!(empty.total_transactions, 0);
    assert_eq!(empty.total_amount, Money::from(0));
    assert_eq!(empty.success_rate, 0);

    let first = orders.create_order(&merchant.id, order_request(100)).await.unwrap();
    let second = orders.create_order(&merchant.id, order_request(200)).await.unwrap();
    let third = orders.create_order(&merchant.id, order_request(500)).await.unwrap();

    let p1 = succeeding.create_payment(Some(&merchant.id), upi_request(&first.id)).await.unwrap();
    let p2 = succeeding.create_payment(Some(&merchant.id), card_request(&second.id)).await.unwrap();
    let p3 = failing.create_payment(Some(&merchant.id), upi_request(&third.id)).await.unwrap();
    await_terminal(&succeeding, &p1.id).await;
    await_terminal(&succeeding, &p2.id).await;
    await_terminal(&succeeding, &p3.id).await;

    let stats = succeeding.merchant_stats(&merchant.id).await.unwrap();
    assert_eq!(stats.total_transactions, 3);
    assert_eq!(stats.total_amount, Money::from(300));
    // round(2 / 3 * 100)
    assert_eq!(stats.success_rate, 67);
}

#[tokio::test]
async fn payment_listing_is_newest_first() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());
    let payments = payment_api(&db, false);

    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();
    let first = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    await_terminal(&payments, &first.id).await;
    let second = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    await_terminal(&payments, &second.id).await;

    let listed = payments.payments_for_merchant(&merchant.id).await.unwrap();
    let ids: Vec<_> = listed.iter().map(|p| p.id.clone()).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn a_closed_settlement_queue_still_yields_a_terminal_payment() {
    let db = support::new_test_database().await;
    let merchant = support::seeded_merchant(&db).await;
    let orders = OrderApi::new(db.clone());

    // No worker is ever started and the receiver is dropped straight away.
    let (queue, jobs) = SettlementQueue::new(4);
    drop(jobs);
    let payments = PaymentFlowApi::new(db.clone(), queue);

    let order = orders.create_order(&merchant.id, order_request(500)).await.unwrap();
    let payment = payments.create_payment(Some(&merchant.id), upi_request(&order.id)).await.unwrap();
    let stored = payments.fetch_payment(&payment.id).await.unwrap();
    assert_eq!(stored.status, PaymentStatusType::Failed);
    assert_eq!(stored.error_code.as_deref(), Some("PROCESSING_ERROR"));
}
