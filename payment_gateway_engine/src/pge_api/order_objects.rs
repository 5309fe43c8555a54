use chrono::{DateTime, Utc};
use pgw_common::Money;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::db_types::{MerchantId, Order, OrderId, OrderStatusType};

/// Payload of an order creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewOrderRequest {
    pub amount: Option<Money>,
    pub currency: Option<String>,
    pub receipt: Option<String>,
    pub notes: Option<JsonValue>,
}

/// Reduced order projection served to the checkout page. No receipt, notes or update time.
#[derive(Debug, Clone, Serialize)]
pub struct PublicOrder {
    pub id: OrderId,
    pub merchant_id: MerchantId,
    pub amount: Money,
    pub currency: String,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
}

impl From<Order> for PublicOrder {
    fn from(order: Order) -> Self {
        Self {
            id: order.id,
            merchant_id: order.merchant_id,
            amount: order.amount,
            currency: order.currency,
            status: order.status,
            created_at: order.created_at,
        }
    }
}

/// Wrapper for the merchant-scoped order listing.
#[derive(Debug, Clone, Serialize)]
pub struct OrdersResult {
    pub orders: Vec<Order>,
}
