use sqlx::{Row, SqliteConnection};

use crate::{
    db::{common::InsertPaymentResult, sqlite::SqliteDatabaseError},
    db_types::{
        MerchantId,
        MerchantStats,
        NewPayment,
        Payment,
        PaymentFailure,
        PaymentId,
        PaymentStatusType,
    },
};

const PAYMENT_COLUMNS: &str = "id, order_id, merchant_id, amount, currency, method, status, vpa, \
                               card_network, card_last4, error_code, error_description, \
                               created_at, updated_at";

/// Inserts a new payment in the `processing` state. The primary key constraint is the
/// uniqueness check; a violation is reported as `DuplicateId`.
pub async fn insert_payment(
    id: &PaymentId,
    payment: &NewPayment,
    conn: &mut SqliteConnection,
) -> Result<InsertPaymentResult, SqliteDatabaseError> {
    let card_network = payment.card_network.map(|n| n.to_string());
    let result = sqlx::query(
        r#"
            INSERT INTO payments (id, order_id, merchant_id, amount, currency, method, vpa, card_network, card_last4)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9);
        "#,
    )
    .bind(id)
    .bind(&payment.order_id)
    .bind(&payment.merchant_id)
    .bind(payment.amount)
    .bind(&payment.currency)
    .bind(payment.method.to_string())
    .bind(&payment.vpa)
    .bind(card_network)
    .bind(&payment.card_last4)
    .execute(&mut *conn)
    .await;
    match result {
        Ok(_) => {
            let payment = fetch_payment_by_id(id, conn)
                .await?
                .ok_or_else(|| SqliteDatabaseError::InsertReadback(id.to_string()))?;
            Ok(InsertPaymentResult::Inserted(payment))
        },
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
            Ok(InsertPaymentResult::DuplicateId)
        },
        Err(e) => Err(e.into()),
    }
}

pub async fn fetch_payment_by_id(
    id: &PaymentId,
    conn: &mut SqliteConnection,
) -> Result<Option<Payment>, SqliteDatabaseError> {
    let payment = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(conn)
    .await?;
    Ok(payment)
}

/// Payments for the merchant, newest first.
pub async fn fetch_payments_for_merchant(
    merchant_id: &MerchantId,
    conn: &mut SqliteConnection,
) -> Result<Vec<Payment>, SqliteDatabaseError> {
    let payments = sqlx::query_as::<_, Payment>(&format!(
        "SELECT {PAYMENT_COLUMNS} FROM payments WHERE merchant_id = $1 ORDER BY created_at DESC, rowid DESC"
    ))
    .bind(merchant_id)
    .fetch_all(conn)
    .await?;
    Ok(payments)
}

/// Moves a payment out of `processing` into the given terminal status. Returns false when the
/// payment was not in `processing`, in which case nothing was changed.
pub(crate) async fn update_payment_status(
    id: &PaymentId,
    status: PaymentStatusType,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let status = status.to_string();
    let processing = PaymentStatusType::Processing.to_string();
    let result = sqlx::query(
        "UPDATE payments SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3",
    )
    .bind(status)
    .bind(id)
    .bind(processing)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Marks a payment as failed with the given error code and description. Returns false when the
/// payment was not in `processing`.
pub(crate) async fn fail_payment(
    id: &PaymentId,
    failure: &PaymentFailure,
    conn: &mut SqliteConnection,
) -> Result<bool, SqliteDatabaseError> {
    let failed = PaymentStatusType::Failed.to_string();
    let processing = PaymentStatusType::Processing.to_string();
    let result = sqlx::query(
        r#"
            UPDATE payments
            SET status = $1, error_code = $2, error_description = $3, updated_at = CURRENT_TIMESTAMP
            WHERE id = $4 AND status = $5;
        "#,
    )
    .bind(failed)
    .bind(&failure.code)
    .bind(&failure.description)
    .bind(id)
    .bind(processing)
    .execute(conn)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Aggregates the merchant's payment statistics in a single query.
pub async fn fetch_merchant_stats(
    merchant_id: &MerchantId,
    conn: &mut SqliteConnection,
) -> Result<MerchantStats, SqliteDatabaseError> {
    let row = sqlx::query(
        r#"
            SELECT
                COUNT(*) AS total_transactions,
                COALESCE(SUM(CASE WHEN status = 'success' THEN amount ELSE 0 END), 0) AS total_amount,
                COUNT(CASE WHEN status = 'success' THEN 1 END) AS successful_payments
            FROM payments
            WHERE merchant_id = $1;
        "#,
    )
    .bind(merchant_id)
    .fetch_one(conn)
    .await?;
    let total_transactions: i64 = row.try_get("total_transactions")?;
    let total_amount: i64 = row.try_get("total_amount")?;
    let successful_payments: i64 = row.try_get("successful_payments")?;
    let success_rate = if total_transactions > 0 {
        ((successful_payments as f64 / total_transactions as f64) * 100.0).round() as i64
    } else {
        0
    };
    Ok(MerchantStats {
        total_transactions,
        total_amount: total_amount.into(),
        success_rate,
    })
}
