//! Request handler definitions.
//!
//! Handlers stay thin: translate the request, call the engine API, map the result. Anything
//! longer belongs in the engine. All handlers are async so that the settlement delay (and any
//! store access) never blocks a worker thread.

use actix_web::{get, post, web, HttpResponse, Responder};
use chrono::Utc;
use log::*;
use payment_gateway_engine::{
    db_types::{OrderId, PaymentId},
    order_objects::{NewOrderRequest, OrdersResult, PublicOrder},
    payment_objects::{NewPaymentRequest, PaymentsResult},
    MerchantApi,
    OrderApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    auth::AuthenticatedMerchant,
    data_objects::{HealthResponse, LoginRequest, MerchantLoginResponse, TestMerchantResponse},
    errors::ServerError,
};

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health(db: web::Data<SqliteDatabase>) -> impl Responder {
    trace!("💻️ Received health check request");
    let database = if db.is_reachable().await { "connected" } else { "disconnected" };
    HttpResponse::Ok().json(HealthResponse { status: "healthy", database, timestamp: Utc::now() })
}

// ----------------------------------------------   Orders  ----------------------------------------------------
#[post("/orders")]
pub async fn create_order(
    auth: AuthenticatedMerchant,
    body: web::Json<NewOrderRequest>,
    api: web::Data<OrderApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST /orders for merchant {}", auth.merchant.id);
    let order = api.create_order(&auth.merchant.id, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(order))
}

#[get("/orders")]
pub async fn my_orders(
    auth: AuthenticatedMerchant,
    api: web::Data<OrderApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET /orders for merchant {}", auth.merchant.id);
    let orders = api.orders_for_merchant(&auth.merchant.id).await?;
    Ok(HttpResponse::Ok().json(OrdersResult { orders }))
}

#[get("/orders/{order_id}")]
pub async fn order_by_id(
    auth: AuthenticatedMerchant,
    path: web::Path<OrderId>,
    api: web::Data<OrderApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET /orders/{id} for merchant {}", auth.merchant.id);
    let order = api.fetch_order_for_merchant(&id, &auth.merchant.id).await?;
    Ok(HttpResponse::Ok().json(order))
}

#[get("/orders/{order_id}/public")]
pub async fn order_by_id_public(
    path: web::Path<OrderId>,
    api: web::Data<OrderApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET /orders/{id}/public");
    let order = api.fetch_order(&id).await?;
    Ok(HttpResponse::Ok().json(PublicOrder::from(order)))
}

// ----------------------------------------------  Payments ----------------------------------------------------
#[post("/payments")]
pub async fn create_payment(
    auth: AuthenticatedMerchant,
    body: web::Json<NewPaymentRequest>,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST /payments for merchant {}", auth.merchant.id);
    let payment = api.create_payment(Some(&auth.merchant.id), body.into_inner()).await?;
    Ok(HttpResponse::Created().json(payment))
}

/// Checkout-page payment creation: no credentials, the merchant comes from the order.
#[post("/payments/public")]
pub async fn create_payment_public(
    body: web::Json<NewPaymentRequest>,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ POST /payments/public against order {}", body.order_id);
    let payment = api.create_payment(None, body.into_inner()).await?;
    Ok(HttpResponse::Created().json(payment))
}

#[get("/payments")]
pub async fn my_payments(
    auth: AuthenticatedMerchant,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET /payments for merchant {}", auth.merchant.id);
    let payments = api.payments_for_merchant(&auth.merchant.id).await?;
    Ok(HttpResponse::Ok().json(PaymentsResult { payments }))
}

#[get("/payments/{payment_id}")]
pub async fn payment_by_id(
    auth: AuthenticatedMerchant,
    path: web::Path<PaymentId>,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    debug!("💻️ GET /payments/{id} for merchant {}", auth.merchant.id);
    let payment = api.fetch_payment_for_merchant(&id, &auth.merchant.id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

#[get("/payments/{payment_id}/public")]
pub async fn payment_by_id_public(
    path: web::Path<PaymentId>,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET /payments/{id}/public");
    let payment = api.fetch_payment(&id).await?;
    Ok(HttpResponse::Ok().json(payment))
}

// ----------------------------------------------  Merchant ----------------------------------------------------
#[get("/merchant/stats")]
pub async fn merchant_stats(
    auth: AuthenticatedMerchant,
    api: web::Data<PaymentFlowApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    debug!("💻️ GET /merchant/stats for merchant {}", auth.merchant.id);
    let stats = api.merchant_stats(&auth.merchant.id).await?;
    Ok(HttpResponse::Ok().json(stats))
}

#[post("/merchant/login")]
pub async fn merchant_login(
    body: web::Json<LoginRequest>,
    api: web::Data<MerchantApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    let email = body
        .into_inner()
        .email
        .filter(|email| !email.trim().is_empty())
        .ok_or_else(|| ServerError::BadRequest("Email is required".to_string()))?;
    debug!("💻️ POST /merchant/login for {email}");
    let merchant = api.login_by_email(&email).await?;
    Ok(HttpResponse::Ok().json(MerchantLoginResponse::from(&merchant)))
}

/// Returns the seeded sandbox merchant so the checkout demo can discover a usable API key.
#[get("/test/merchant")]
pub async fn test_merchant(
    api: web::Data<MerchantApi<SqliteDatabase>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET /test/merchant");
    let merchant = api.test_merchant().await?;
    Ok(HttpResponse::Ok().json(TestMerchantResponse::from(&merchant)))
}
