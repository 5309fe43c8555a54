use chrono::{DateTime, Utc};
use payment_gateway_engine::db_types::{Merchant, MerchantId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
}

/// The dashboard login response. This is the one place the API secret leaves the server; the
/// dashboard stores it and replays it on every authenticated call.
#[derive(Debug, Clone, Serialize)]
pub struct MerchantLoginResponse {
    pub id: MerchantId,
    pub name: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: String,
}

impl From<&Merchant> for MerchantLoginResponse {
    fn from(merchant: &Merchant) -> Self {
        Self {
            id: merchant.id.clone(),
            name: merchant.name.clone(),
            email: merchant.email.clone(),
            api_key: merchant.api_key.clone(),
            api_secret: merchant.api_secret.reveal().clone(),
        }
    }
}

/// Reduced projection of the seeded sandbox merchant, used by the checkout demo to discover a
/// usable API key.
#[derive(Debug, Clone, Serialize)]
pub struct TestMerchantResponse {
    pub id: MerchantId,
    pub email: String,
    pub api_key: String,
    pub seeded: bool,
}

impl From<&Merchant> for TestMerchantResponse {
    fn from(merchant: &Merchant) -> Self {
        Self {
            id: merchant.id.clone(),
            email: merchant.email.clone(),
            api_key: merchant.api_key.clone(),
            seeded: true,
        }
    }
}
