use std::fmt::Debug;

use log::*;
use pgw_common::{Money, INR_CURRENCY_CODE};

use crate::{
    db::{common::InsertOrderResult, traits::OrderManagement},
    db_types::{MerchantId, NewOrder, Order, OrderId, MINIMUM_ORDER_AMOUNT, ORDER_ID_PREFIX},
    helpers::{random_id, MAX_ID_ATTEMPTS},
    pge_api::{errors::OrderApiError, order_objects::NewOrderRequest},
};

/// `OrderApi` handles order creation and retrieval on behalf of merchants.
pub struct OrderApi<B> {
    db: B,
}

impl<B> Debug for OrderApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "OrderApi")
    }
}

impl<B> OrderApi<B>
where B: OrderManagement
{
    pub fn new(db: B) -> Self {
        Self { db }
    }

    /// Creates a new order for the merchant. The amount must be at least 100 of the smallest
    /// currency unit (a missing amount counts as zero); the currency defaults to INR. The
    /// generated identifier is inserted atomically and regenerated on a collision.
    pub async fn create_order(
        &self,
        merchant_id: &MerchantId,
        request: NewOrderRequest,
    ) -> Result<Order, OrderApiError> {
        let amount = request.amount.unwrap_or_default();
        if amount < Money::from(MINIMUM_ORDER_AMOUNT) {
            return Err(OrderApiError::AmountBelowMinimum);
        }
        let order = NewOrder {
            merchant_id: merchant_id.clone(),
            amount,
            currency: request.currency.unwrap_or_else(|| INR_CURRENCY_CODE.to_string()),
            receipt: request.receipt,
            notes: request.notes,
        };
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = OrderId::from(random_id(ORDER_ID_PREFIX));
            match self
                .db
                .insert_order(&id, &order)
                .await
                .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?
            {
                InsertOrderResult::Inserted(order) => {
                    debug!("🔄️📦️ Order {} of {} created for merchant {}", order.id, order.amount, order.merchant_id);
                    return Ok(order);
                },
                InsertOrderResult::DuplicateId => {
                    warn!("🔄️📦️ Order id {id} is already taken. Generating a new one");
                },
            }
        }
        error!("🔄️📦️ No unused order id found after {MAX_ID_ATTEMPTS} attempts");
        Err(OrderApiError::IdentifierSpaceExhausted)
    }

    /// Fetches an order on behalf of a merchant. An order belonging to another merchant is
    /// reported as not found rather than as a permission failure.
    pub async fn fetch_order_for_merchant(
        &self,
        id: &OrderId,
        merchant_id: &MerchantId,
    ) -> Result<Order, OrderApiError> {
        let order = self.fetch_order(id).await?;
        if order.merchant_id != *merchant_id {
            return Err(OrderApiError::OrderNotFound);
        }
        Ok(order)
    }

    /// Fetches an order without an ownership check. Used by the public checkout path.
    pub async fn fetch_order(&self, id: &OrderId) -> Result<Order, OrderApiError> {
        self.db
            .fetch_order_by_id(id)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))?
            .ok_or(OrderApiError::OrderNotFound)
    }

    /// All of the merchant's orders, newest first.
    pub async fn orders_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Order>, OrderApiError> {
        self.db
            .fetch_orders_for_merchant(merchant_id)
            .await
            .map_err(|e| OrderApiError::DatabaseError(e.to_string()))
    }
}
