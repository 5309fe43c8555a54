use sqlx::SqliteConnection;

use crate::{
    db::{common::InsertMerchantResult, sqlite::SqliteDatabaseError},
    db_types::{Merchant, MerchantId, NewMerchant},
};

const MERCHANT_COLUMNS: &str =
    "id, name, email, api_key, api_secret, is_active, created_at, updated_at";

/// Inserts a new merchant. Both the id and the email carry uniqueness constraints; a violation
/// of either is reported as `DuplicateId`.
pub async fn insert_merchant(
    id: &MerchantId,
    merchant: &NewMerchant,
    conn: &mut SqliteConnection,
) -> Result<InsertMerchantResult, SqliteDatabaseError> {
    let result = sqlx::query(
        r#"
            INSERT INTO merchants (id, name, email, api_key, api_secret)
            VALUES ($1, $2, $3, $4, $5);
        "#,
    )
    .bind(id)
    .bind(&merchant.name)
    .bind(&merchant.email)
    .bind(&merchant.api_key)
    .bind(merchant.api_secret.reveal())
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {
            let merchant = fetch_merchant_by_email(&merchant.email, conn)
                .await?
                .ok_or_else(|| SqliteDatabaseError::InsertReadback(id.to_string()))?;
            Ok(InsertMerchantResult::Inserted(merchant))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Ok(InsertMerchantResult::DuplicateId)
        },
        Err(e) => Err(e.into()),
    }
}

/// Looks a merchant up by its API credential pair. The comparison runs in the store; the secret
/// is never read out for checking.
pub async fn fetch_merchant_by_credentials(
    api_key: &str,
    api_secret: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, SqliteDatabaseError> {
    let merchant = sqlx::query_as::<_, Merchant>(&format!(
        "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE api_key = $1 AND api_secret = $2"
    ))
    .bind(api_key)
    .bind(api_secret)
    .fetch_optional(conn)
    .await?;
    Ok(merchant)
}

pub async fn fetch_merchant_by_email(
    email: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Merchant>, SqliteDatabaseError> {
    let merchant = sqlx::query_as::<_, Merchant>(&format!(
        "SELECT {MERCHANT_COLUMNS} FROM merchants WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(merchant)
}
