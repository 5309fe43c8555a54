use payment_gateway_engine::{db_types::Merchant, MerchantApi, SqliteDatabase};

/// A fresh in-memory database. A single pool connection keeps every handle on the same memory
/// store.
pub async fn new_test_database() -> SqliteDatabase {
    let _ = env_logger::try_init();
    SqliteDatabase::new_with_url("sqlite::memory:", 1)
        .await
        .expect("Could not create the in-memory test database")
}

pub async fn seeded_merchant(db: &SqliteDatabase) -> Merchant {
    MerchantApi::new(db.clone())
        .seed_test_merchant()
        .await
        .expect("Could not seed the test merchant")
}
