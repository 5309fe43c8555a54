use std::fmt::Debug;

use log::*;
use pgw_common::Secret;

use crate::{
    db::{common::InsertMerchantResult, traits::MerchantManagement},
    db_types::{Merchant, MerchantId, NewMerchant, MERCHANT_ID_PREFIX},
    helpers::{random_id, MAX_ID_ATTEMPTS},
    pge_api::errors::MerchantApiError,
};

/// Credentials of the merchant seeded into every fresh deployment. The dashboard and checkout
/// demo flows, and the test suites, all authenticate as this merchant.
pub const TEST_MERCHANT_NAME: &str = "Test Merchant";
pub const TEST_MERCHANT_EMAIL: &str = "test@example.com";
pub const TEST_MERCHANT_API_KEY: &str = "key_test_abc123";
pub const TEST_MERCHANT_API_SECRET: &str = "secret_test_xyz789";

/// `MerchantApi` resolves credentials to merchant identities and handles seeding.
pub struct MerchantApi<B> {
    db: B,
}

impl<B> Debug for MerchantApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MerchantApi")
    }
}

impl<B> MerchantApi<B>
where B: MerchantManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Resolves an API key/secret pair to an active merchant.
    pub async fn authenticate(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Merchant, MerchantApiError> {
        let merchant = self
            .db
            .fetch_merchant_by_credentials(api_key, api_secret)
            .await
            .map_err(|e| MerchantApiError::DatabaseError(e.to_string()))?
            .ok_or(MerchantApiError::InvalidCredentials)?;
        if !merchant.is_active {
            return Err(MerchantApiError::InactiveMerchant);
        }
        Ok(merchant)
    }

    /// Dashboard login. The sandbox trusts the email alone and hands back the stored
    /// credentials for subsequent API calls.
    pub async fn login_by_email(&self, email: &str) -> Result<Merchant, MerchantApiError> {
        let merchant = self
            .db
            .fetch_merchant_by_email(email)
            .await
            .map_err(|e| MerchantApiError::DatabaseError(e.to_string()))?
            .ok_or(MerchantApiError::InvalidCredentials)?;
        if !merchant.is_active {
            return Err(MerchantApiError::InactiveMerchant);
        }
        Ok(merchant)
    }

    /// Returns the merchant with the given email, creating it if it does not exist yet.
    /// Idempotent by email; the generated identifier is regenerated on a collision.
    pub async fn fetch_or_create_merchant(
        &self,
        merchant: NewMerchant,
    ) -> Result<Merchant, MerchantApiError> {
        if let Some(existing) = self
            .db
            .fetch_merchant_by_email(&merchant.email)
            .await
            .map_err(|e| MerchantApiError::DatabaseError(e.to_string()))?
        {
            debug!("🔄️ Merchant {} already exists", existing.email);
            return Ok(existing);
        }
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = MerchantId::from(random_id(MERCHANT_ID_PREFIX));
            match self
                .db
                .insert_merchant(&id, &merchant)
                .await
                .map_err(|e| MerchantApiError::DatabaseError(e.to_string()))?
            {
                InsertMerchantResult::Inserted(merchant) => {
                    info!("🔄️ Merchant {} ({}) created", merchant.id, merchant.email);
                    return Ok(merchant);
                },
                InsertMerchantResult::DuplicateId => {
                    warn!("🔄️ Merchant id {id} is already taken. Generating a new one");
                },
            }
        }
        error!("🔄️ No unused merchant id found after {MAX_ID_ATTEMPTS} attempts");
        Err(MerchantApiError::IdentifierSpaceExhausted)
    }

    /// Ensures the seeded sandbox merchant exists and returns it.
    pub async fn seed_test_merchant(&self) -> Result<Merchant, MerchantApiError> {
        self.fetch_or_create_merchant(NewMerchant {
            name: TEST_MERCHANT_NAME.to_string(),
            email: TEST_MERCHANT_EMAIL.to_string(),
            api_key: TEST_MERCHANT_API_KEY.to_string(),
            api_secret: Secret::new(TEST_MERCHANT_API_SECRET.to_string()),
        })
        .await
    }

    /// Looks up the seeded sandbox merchant without creating it.
    pub async fn test_merchant(&self) -> Result<Merchant, MerchantApiError> {
        self.db
            .fetch_merchant_by_email(TEST_MERCHANT_EMAIL)
            .await
            .map_err(|e| MerchantApiError::DatabaseError(e.to_string()))?
            .ok_or(MerchantApiError::MerchantNotFound)
    }
}
