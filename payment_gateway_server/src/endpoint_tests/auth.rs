use actix_web::http::StatusCode;
use payment_gateway_engine::{TEST_MERCHANT_API_KEY, TEST_MERCHANT_EMAIL};
use serde_json::json;

use super::helpers::{
    error_code,
    get_unauthenticated,
    get_with_credentials,
    post_unauthenticated,
    setup,
};

#[actix_web::test]
async fn missing_credentials_are_rejected() {
    let gateway = setup(true).await;
    let (status, body) = get_unauthenticated(&gateway, "/api/v1/orders").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTHENTICATION_ERROR");
    assert_eq!(body["error"]["description"], "Invalid API credentials");
}

#[actix_web::test]
async fn wrong_credentials_are_rejected() {
    let gateway = setup(true).await;
    let (status, body) =
        get_with_credentials(&gateway, "/api/v1/orders", TEST_MERCHANT_API_KEY, "not-the-secret")
            .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTHENTICATION_ERROR");
}

#[actix_web::test]
async fn login_returns_the_stored_credentials() {
    let gateway = setup(true).await;
    let (status, body) = post_unauthenticated(
        &gateway,
        "/api/v1/merchant/login",
        json!({ "email": TEST_MERCHANT_EMAIL }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], TEST_MERCHANT_EMAIL);
    assert_eq!(body["api_key"], TEST_MERCHANT_API_KEY);
    assert!(body["api_secret"].as_str().is_some());
}

#[actix_web::test]
async fn login_requires_an_email() {
    let gateway = setup(true).await;
    let (status, body) = post_unauthenticated(&gateway, "/api/v1/merchant/login", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "BAD_REQUEST_ERROR");
    assert_eq!(body["error"]["description"], "Email is required");
}

#[actix_web::test]
async fn login_with_an_unknown_email_fails() {
    let gateway = setup(true).await;
    let (status, body) = post_unauthenticated(
        &gateway,
        "/api/v1/merchant/login",
        json!({ "email": "nobody@example.com" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "AUTHENTICATION_ERROR");
}

#[actix_web::test]
async fn the_seeded_merchant_is_discoverable() {
    let gateway = setup(true).await;
    let (status, body) = get_unauthenticated(&gateway, "/api/v1/test/merchant").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], TEST_MERCHANT_EMAIL);
    assert_eq!(body["api_key"], TEST_MERCHANT_API_KEY);
    assert_eq!(body["seeded"], true);
    // The secret is not part of this projection.
    assert!(body.get("api_secret").is_none());
}

#[actix_web::test]
async fn health_does_not_require_credentials() {
    let gateway = setup(true).await;
    let (status, body) = get_unauthenticated(&gateway, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}

#[actix_web::test]
async fn unknown_endpoints_return_the_error_envelope() {
    let gateway = setup(true).await;
    let (status, body) = get_unauthenticated(&gateway, "/api/v1/nope").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND_ERROR");
    assert_eq!(body["error"]["description"], "Endpoint not found");
}
