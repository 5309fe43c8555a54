use crate::{
    db::common::InsertOrderResult,
    db_types::{MerchantId, NewOrder, Order, OrderId},
};

/// Storage operations for orders. The store is the sole source of truth; callers re-read state
/// through these methods before every decision rather than caching rows.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    type Error: std::error::Error;

    /// Inserts a new order under the given identifier. The insert itself is the uniqueness
    /// check: an id collision is reported as [`InsertOrderResult::DuplicateId`] rather than an
    /// error, and the caller regenerates the id.
    async fn insert_order(&self, id: &OrderId, order: &NewOrder)
        -> Result<InsertOrderResult, Self::Error>;

    async fn fetch_order_by_id(&self, id: &OrderId) -> Result<Option<Order>, Self::Error>;

    /// All orders for the merchant, newest first.
    async fn fetch_orders_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Order>, Self::Error>;
}
