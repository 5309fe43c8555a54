use std::time::Duration;

use actix_web::{http::StatusCode, test, test::TestRequest, App};
use payment_gateway_engine::{
    settlement::{SettlementConfig, SettlementQueue},
    MerchantApi,
    SqliteDatabase,
    TEST_MERCHANT_API_KEY,
    TEST_MERCHANT_API_SECRET,
};
use serde_json::Value as JsonValue;

use crate::{
    auth::{API_KEY_HEADER, API_SECRET_HEADER},
    server::configure_app,
    settlement_worker::start_settlement_worker,
};

pub const SETTLE_DELAY: Duration = Duration::from_millis(25);

/// A running gateway backend: in-memory store, seeded sandbox merchant and a live settlement
/// worker with the given forced outcome. Requests are made against it via [`get`] and [`post`].
pub struct TestGateway {
    pub db: SqliteDatabase,
    pub queue: SettlementQueue,
}

pub async fn setup(outcome: bool) -> TestGateway {
    let _ = env_logger::try_init();
    let db = SqliteDatabase::new_with_url("sqlite::memory:", 1)
        .await
        .expect("Could not create the in-memory test database");
    MerchantApi::new(db.clone())
        .seed_test_merchant()
        .await
        .expect("Could not seed the test merchant");
    let (queue, jobs) = SettlementQueue::new(64);
    start_settlement_worker(db.clone(), SettlementConfig::deterministic(SETTLE_DELAY, outcome), jobs);
    TestGateway { db, queue }
}

async fn call(gateway: &TestGateway, req: TestRequest) -> (StatusCode, JsonValue) {
    let app = {
        let db = gateway.db.clone();
        let queue = gateway.queue.clone();
        test::init_service(App::new().configure(move |cfg| configure_app(cfg, db, queue))).await
    };
    let res = test::call_service(&app, req.to_request()).await;
    let status = res.status();
    let body: JsonValue = test::read_body_json(res).await;
    (status, body)
}

fn with_credentials(req: TestRequest, key: &str, secret: &str) -> TestRequest {
    req.insert_header((API_KEY_HEADER, key.to_string()))
        .insert_header((API_SECRET_HEADER, secret.to_string()))
}

pub async fn get(gateway: &TestGateway, path: &str) -> (StatusCode, JsonValue) {
    let req = with_credentials(TestRequest::get().uri(path), TEST_MERCHANT_API_KEY, TEST_MERCHANT_API_SECRET);
    call(gateway, req).await
}

pub async fn get_unauthenticated(gateway: &TestGateway, path: &str) -> (StatusCode, JsonValue) {
    call(gateway, TestRequest::get().uri(path)).await
}

pub async fn get_with_credentials(
    gateway: &TestGateway,
    path: &str,
    key: &str,
    secret: &str,
) -> (StatusCode, JsonValue) {
    let req = with_credentials(TestRequest::get().uri(path), key, secret);
    call(gateway, req).await
}

pub async fn post(gateway: &TestGateway, path: &str, body: JsonValue) -> (StatusCode, JsonValue) {
    let req = with_credentials(
        TestRequest::post().uri(path).set_json(body),
        TEST_MERCHANT_API_KEY,
        TEST_MERCHANT_API_SECRET,
    );
    call(gateway, req).await
}

pub async fn post_unauthenticated(
    gateway: &TestGateway,
    path: &str,
    body: JsonValue,
) -> (StatusCode, JsonValue) {
    call(gateway, TestRequest::post().uri(path).set_json(body)).await
}

pub async fn post_raw(gateway: &TestGateway, path: &str, payload: &'static str) -> (StatusCode, JsonValue) {
    let req = with_credentials(
        TestRequest::post()
            .uri(path)
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload),
        TEST_MERCHANT_API_KEY,
        TEST_MERCHANT_API_SECRET,
    );
    call(gateway, req).await
}

/// The code inside the standard error envelope.
pub fn error_code(body: &JsonValue) -> &str {
    body["error"]["code"].as_str().unwrap_or("<no error code>")
}

/// Creates an order through the API and returns its id.
pub async fn create_order(gateway: &TestGateway, amount: i64) -> String {
    let (status, body) =
        post(gateway, "/api/v1/orders", serde_json::json!({ "amount": amount })).await;
    assert_eq!(status, StatusCode::CREATED, "order creation failed: {body}");
    body["id"].as_str().expect("order id missing").to_string()
}

/// Polls the payment endpoint until the payment leaves `processing`.
pub async fn poll_payment_until_terminal(gateway: &TestGateway, payment_id: &str) -> JsonValue {
    for _ in 0..200 {
        let (status, body) = get(gateway, &format!("/api/v1/payments/{payment_id}")).await;
        assert_eq!(status, StatusCode::OK, "payment lookup failed: {body}");
        if body["status"] != "processing" {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("Payment {payment_id} never left the processing state");
}
