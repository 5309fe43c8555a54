use sqlx::SqliteConnection;

use crate::{
    db::{common::InsertOrderResult, sqlite::SqliteDatabaseError},
    db_types::{MerchantId, NewOrder, Order, OrderId, OrderStatusType},
};

const ORDER_COLUMNS: &str =
    "id, merchant_id, amount, currency, receipt, notes, status, created_at, updated_at";

/// Inserts a new order in the `created` state. The primary key constraint is the uniqueness
/// check; a violation is reported as `DuplicateId` so the caller can regenerate the identifier.
pub async fn insert_order(
    id: &OrderId,
    order: &NewOrder,
    conn: &mut SqliteConnection,
) -> Result<InsertOrderResult, SqliteDatabaseError> {
    let notes = order.notes.as_ref().map(serde_json::to_string).transpose()?;
    let result = sqlx::query(
        r#"
            INSERT INTO orders (id, merchant_id, amount, currency, receipt, notes)
            VALUES ($1, $2, $3, $4, $5, $6);
        "#,
    )
    .bind(id)
    .bind(&order.merchant_id)
    .bind(order.amount)
    .bind(&order.currency)
    .bind(&order.receipt)
    .bind(notes)
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {
            let order = fetch_order_by_id(id, conn)
                .await?
                .ok_or_else(|| SqliteDatabaseError::InsertReadback(id.to_string()))?;
            Ok(InsertOrderResult::Inserted(order))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Ok(InsertOrderResult::DuplicateId)
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_order_by_id(
    id: &OrderId,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, SqliteDatabaseError> {
    let order = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(order)
}

/// Orders for the merchant, newest first. The rowid tiebreak keeps the ordering stable for rows
/// created within the same timestamp second.
pub async fn fetch_orders_for_merchant(
    merchant_id: &MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Order>, SqliteDatabaseError> {
    let orders = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE merchant_id = $1 ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(merchant_id)
    .fetch_all(conn)
    .await?;
    Ok(orders)
}

pub(crate) async fn update_order_status(
    id: &OrderId,
    status: OrderStatusType,
    conn: &mut SqliteConnection,
) -> Result<(), SqliteDatabaseError> {
    let status = status.to_string();
    let _ = sqlx::query("UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2")
        .bind(status)
        .bind(id)
        .execute(conn)
        .await?;
    Ok(())
}
