use serde::{Deserialize, Serialize};

use crate::{
    db_types::{OrderId, Payment},
    validation::CardDetails,
};

/// Payload of a payment creation request. `method` arrives as free text and is parsed by the
/// engine so an unknown method maps to a bad-request outcome rather than a deserialization
/// failure.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPaymentRequest {
    pub order_id: OrderId,
    pub method: String,
    pub vpa: Option<String>,
    pub card: Option<CardDetails>,
}

/// Wrapper for the merchant-scoped payment listing.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentsResult {
    pub payments: Vec<Payment>,
}
