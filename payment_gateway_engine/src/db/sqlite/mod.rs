mod db;
mod errors;

pub mod merchants;
pub mod orders;
pub mod payments;

use std::str::FromStr;

pub use db::SqliteDatabase;
pub use errors::SqliteDatabaseError;
use log::info;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

const MERCHANTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS merchants (
        id         TEXT PRIMARY KEY,
        name       TEXT NOT NULL,
        email      TEXT NOT NULL UNIQUE,
        api_key    TEXT NOT NULL UNIQUE,
        api_secret TEXT NOT NULL,
        is_active  BOOLEAN NOT NULL DEFAULT 1,
        created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

const ORDERS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS orders (
        id          TEXT PRIMARY KEY,
        merchant_id TEXT NOT NULL REFERENCES merchants (id),
        amount      INTEGER NOT NULL CHECK (amount >= 100),
        currency    TEXT NOT NULL DEFAULT 'INR',
        receipt     TEXT,
        notes       TEXT,
        status      TEXT NOT NULL DEFAULT 'created',
        created_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at  TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

const PAYMENTS_DDL: &str = r#"
    CREATE TABLE IF NOT EXISTS payments (
        id                TEXT PRIMARY KEY,
        order_id          TEXT NOT NULL REFERENCES orders (id),
        merchant_id       TEXT NOT NULL REFERENCES merchants (id),
        amount            INTEGER NOT NULL,
        currency          TEXT NOT NULL DEFAULT 'INR',
        method            TEXT NOT NULL,
        status            TEXT NOT NULL DEFAULT 'processing',
        vpa               TEXT,
        card_network      TEXT,
        card_last4        TEXT,
        error_code        TEXT,
        error_description TEXT,
        created_at        TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
        updated_at        TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
    );
"#;

const SCHEMA: [&str; 6] = [
    MERCHANTS_DDL,
    ORDERS_DDL,
    PAYMENTS_DDL,
    "CREATE INDEX IF NOT EXISTS idx_orders_merchant_id ON orders (merchant_id);",
    "CREATE INDEX IF NOT EXISTS idx_payments_order_id ON payments (order_id);",
    "CREATE INDEX IF NOT EXISTS idx_payments_status ON payments (status);",
];

pub async fn new_pool(url: &str, max_connections: u32) -> Result<SqlitePool, SqliteDatabaseError> {
    let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
    let pool =
        SqlitePoolOptions::new().max_connections(max_connections).connect_with(options).await?;
    create_schema(&pool).await?;
    Ok(pool)
}

/// Brings the database up to the expected schema. Every statement is idempotent, so this runs
/// unconditionally whenever a pool is created.
async fn create_schema(pool: &SqlitePool) -> Result<(), SqliteDatabaseError> {
    for statement in SCHEMA {
        sqlx::query(statement).execute(pool).await?;
    }
    info!("🗃️ Database schema is in place");
    Ok(())
}
