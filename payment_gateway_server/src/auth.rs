use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures::{future::LocalBoxFuture, FutureExt};
use log::debug;
use payment_gateway_engine::{db_types::Merchant, MerchantApi, SqliteDatabase};

use crate::errors::ServerError;

pub const API_KEY_HEADER: &str = "X-Api-Key";
pub const API_SECRET_HEADER: &str = "X-Api-Secret";

/// Extracts and authenticates the calling merchant from the `X-Api-Key`/`X-Api-Secret` header
/// pair. A handler taking this extractor is merchant-scoped; handlers without it are public.
pub struct AuthenticatedMerchant {
    pub merchant: Merchant,
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers().get(name).and_then(|value| value.to_str().ok()).map(|s| s.to_string())
}

impl FromRequest for AuthenticatedMerchant {
    type Error = ServerError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let api = req.app_data::<web::Data<MerchantApi<SqliteDatabase>>>().cloned();
        let key = header_value(req, API_KEY_HEADER);
        let secret = header_value(req, API_SECRET_HEADER);
        async move {
            let api = api.ok_or_else(|| {
                ServerError::BackendError("Merchant API is not configured".to_string())
            })?;
            let (key, secret) = key.zip(secret).ok_or_else(|| {
                ServerError::AuthenticationError("Invalid API credentials".to_string())
            })?;
            let merchant = api.authenticate(&key, &secret).await?;
            debug!("💻️ Request authenticated for merchant {}", merchant.id);
            Ok(Self { merchant })
        }
        .boxed_local()
    }
}
