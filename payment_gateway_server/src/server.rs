use std::time::Duration;

use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::Logger,
    web,
    App,
    HttpResponse,
    HttpServer,
    ResponseError,
};
use log::*;
use payment_gateway_engine::{
    settlement::{SettlementQueue, DEFAULT_QUEUE_DEPTH},
    MerchantApi,
    OrderApi,
    PaymentFlowApi,
    SqliteDatabase,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    routes::{
        create_order,
        create_payment,
        create_payment_public,
        health,
        merchant_login,
        merchant_stats,
        my_orders,
        my_payments,
        order_by_id,
        order_by_id_public,
        payment_by_id,
        payment_by_id_public,
        test_merchant,
    },
    settlement_worker::start_settlement_worker,
};

const DB_POOL_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, DB_POOL_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    match MerchantApi::new(db.clone()).seed_test_merchant().await {
        Ok(merchant) => info!("🚀️ Sandbox merchant {} ({}) is available", merchant.id, merchant.email),
        Err(e) => warn!("🚀️ Could not seed the sandbox merchant: {e}"),
    }
    let (queue, jobs) = SettlementQueue::new(DEFAULT_QUEUE_DEPTH);
    start_settlement_worker(db.clone(), config.settlement.clone(), jobs);
    let srv = create_server_instance(config, db, queue)?;
    srv.await.map_err(|e| ServerError::InitializeError(e.to_string()))
}

pub fn create_server_instance(
    config: ServerConfig,
    db: SqliteDatabase,
    queue: SettlementQueue,
) -> Result<Server, ServerError> {
    let srv = HttpServer::new(move || {
        let db = db.clone();
        let queue = queue.clone();
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("pgw::access_log"))
            .configure(|cfg| configure_app(cfg, db, queue))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((config.host.as_str(), config.port))
    .map_err(|e| ServerError::InitializeError(e.to_string()))?
    .run();
    Ok(srv)
}

/// Registers every route and shared API handle. The endpoint tests reuse this to build exactly
/// the app the server runs.
pub fn configure_app(cfg: &mut web::ServiceConfig, db: SqliteDatabase, queue: SettlementQueue) {
    let order_api = OrderApi::new(db.clone());
    let payment_api = PaymentFlowApi::new(db.clone(), queue);
    let merchant_api = MerchantApi::new(db.clone());
    cfg.app_data(web::Data::new(db))
        .app_data(web::Data::new(order_api))
        .app_data(web::Data::new(payment_api))
        .app_data(web::Data::new(merchant_api))
        .app_data(json_config())
        .service(health)
        .service(
            web::scope("/api/v1")
                .service(create_order)
                .service(my_orders)
                .service(order_by_id_public)
                .service(order_by_id)
                .service(create_payment_public)
                .service(create_payment)
                .service(my_payments)
                .service(payment_by_id_public)
                .service(payment_by_id)
                .service(merchant_stats)
                .service(merchant_login)
                .service(test_merchant),
        )
        .default_service(web::route().to(endpoint_not_found));
}

// Malformed or undeserializable JSON bodies come back in the standard error envelope.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .error_handler(|err, _req| ServerError::BadRequest(err.to_string()).into())
}

async fn endpoint_not_found() -> HttpResponse {
    ServerError::NotFound("Endpoint not found".to_string()).error_response()
}
