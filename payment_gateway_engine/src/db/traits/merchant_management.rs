use crate::{
    db::common::InsertMerchantResult,
    db_types::{Merchant, MerchantId, NewMerchant},
};

/// Storage operations for merchant identities and credentials.
#[allow(async_fn_in_trait)]
pub trait MerchantManagement: Clone {
    type Error: std::error::Error;

    /// Resolves an API key/secret pair to a merchant, active or not. Credential comparison
    /// happens in the store so the secret never needs to be read out for the check.
    async fn fetch_merchant_by_credentials(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Option<Merchant>, Self::Error>;

    async fn fetch_merchant_by_email(&self, email: &str) -> Result<Option<Merchant>, Self::Error>;

    /// Inserts a new merchant under the given identifier. Collisions (id or email) are reported
    /// as [`InsertMerchantResult::DuplicateId`].
    async fn insert_merchant(
        &self,
        id: &MerchantId,
        merchant: &NewMerchant,
    ) -> Result<InsertMerchantResult, Self::Error>;
}
