use thiserror::Error;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Error)]
pub enum OrderApiError {
    #[error("amount must be at least 100")]
    AmountBelowMinimum,
    #[error("Order not found")]
    OrderNotFound,
    #[error("Could not find an unused order identifier")]
    IdentifierSpaceExhausted,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, Error)]
pub enum PaymentApiError {
    #[error("Order not found")]
    OrderNotFound,
    #[error("Payment not found")]
    PaymentNotFound,
    #[error("Order has already been paid")]
    OrderAlreadyPaid,
    #[error("Invalid payment method. Must be \"upi\" or \"card\"")]
    UnsupportedMethod,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Could not find an unused payment identifier")]
    IdentifierSpaceExhausted,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, Error)]
pub enum MerchantApiError {
    #[error("Invalid API credentials")]
    InvalidCredentials,
    #[error("Merchant account is inactive")]
    InactiveMerchant,
    #[error("Merchant not found")]
    MerchantNotFound,
    #[error("Could not find an unused merchant identifier")]
    IdentifierSpaceExhausted,
    #[error("Database error: {0}")]
    DatabaseError(String),
}
