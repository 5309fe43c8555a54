use std::fmt::Debug;

use log::*;
use sqlx::SqlitePool;

use crate::{
    db::{
        common::{InsertMerchantResult, InsertOrderResult, InsertPaymentResult},
        sqlite::{merchants, new_pool, orders, payments, SqliteDatabaseError},
        traits::{MerchantManagement, OrderManagement, PaymentManagement},
    },
    db_types::{
        Merchant,
        MerchantId,
        MerchantStats,
        NewMerchant,
        NewOrder,
        NewPayment,
        Order,
        OrderId,
        OrderStatusType,
        Payment,
        PaymentFailure,
        PaymentId,
        PaymentStatusType,
    },
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl SqliteDatabase {
    /// Creates a new database handle, bootstrapping the schema if necessary.
    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, SqliteDatabaseError> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Lightweight connectivity probe for the health endpoint.
    pub async fn is_reachable(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl MerchantManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn fetch_merchant_by_credentials(
        &self,
        api_key: &str,
        api_secret: &str,
    ) -> Result<Option<Merchant>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        merchants::fetch_merchant_by_credentials(api_key, api_secret, &mut conn).await
    }

    async fn fetch_merchant_by_email(&self, email: &str) -> Result<Option<Merchant>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        merchants::fetch_merchant_by_email(email, &mut conn).await
    }

    async fn insert_merchant(
        &self,
        id: &MerchantId,
        merchant: &NewMerchant,
    ) -> Result<InsertMerchantResult, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        merchants::insert_merchant(id, merchant, &mut conn).await
    }
}

impl OrderManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_order(
        &self,
        id: &OrderId,
        order: &NewOrder,
    ) -> Result<InsertOrderResult, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::insert_order(id, order, &mut conn).await
    }

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_order_by_id(id, &mut conn).await
    }

    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Order>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        orders::fetch_orders_for_merchant(merchant_id, &mut conn).await
    }
}

impl PaymentManagement for SqliteDatabase {
    type Error = SqliteDatabaseError;

    async fn insert_payment(
        &self,
        id: &PaymentId,
        payment: &NewPayment,
    ) -> Result<InsertPaymentResult, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        payments::insert_payment(id, payment, &mut conn).await
    }

    async fn fetch_payment_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payment_by_id(id, &mut conn).await
    }

    async fn fetch_payments_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Payment>, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_payments_for_merchant(merchant_id, &mut conn).await
    }

    /// Settles a payment successfully. The payment transition and the order's move to `paid`
    /// commit in the same transaction, so a reader never observes a successful payment against
    /// an unpaid order.
    async fn mark_payment_success(
        &self,
        id: &PaymentId,
        order_id: &OrderId,
    ) -> Result<(), Self::Error> {
        let mut tx = self.pool.begin().await?;
        let updated =
            payments::update_payment_status(id, PaymentStatusType::Success, &mut tx).await?;
        if !updated {
            warn!("🗃️ Payment {id} is no longer 'processing'. Leaving it and order {order_id} untouched");
            tx.rollback().await?;
            return Ok(());
        }
        orders::update_order_status(order_id, OrderStatusType::Paid, &mut tx).await?;
        tx.commit().await?;
        debug!("🗃️ Payment {id} settled. Order {order_id} is now paid");
        Ok(())
    }

    async fn mark_payment_failed(
        &self,
        id: &PaymentId,
        failure: &PaymentFailure,
    ) -> Result<(), Self::Error> {
        let mut conn = self.pool.acquire().await?;
        let updated = payments::fail_payment(id, failure, &mut conn).await?;
        if updated {
            debug!("🗃️ Payment {id} failed with {}", failure.code);
        } else {
            warn!("🗃️ Payment {id} is no longer 'processing'. Failure {} not recorded", failure.code);
        }
        Ok(())
    }

    async fn fetch_merchant_stats(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<MerchantStats, Self::Error> {
        let mut conn = self.pool.acquire().await?;
        payments::fetch_merchant_stats(merchant_id, &mut conn).await
    }
}
