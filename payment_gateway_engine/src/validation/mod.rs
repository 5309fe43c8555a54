//! Pure validation of payment method inputs.
//!
//! Every function here is a hard gate on the synchronous payment creation path: a payment row is
//! only ever written after its method-specific details validated. The error messages are
//! payer-facing and are returned verbatim by the HTTP layer, so they are part of the contract.

mod card;
mod vpa;

pub use card::{
    card_last4,
    detect_card_network,
    validate_card,
    validate_card_number,
    validate_cvv,
    validate_expiry,
    CardDetails,
    ValidCard,
};
use thiserror::Error;
pub use vpa::validate_vpa;

/// A rejected payment input. The variant selects the error code the HTTP layer reports
/// (`INVALID_VPA`, `INVALID_CARD`, `EXPIRED_CARD`); the message is shown to the payer as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0}")]
    InvalidVpa(String),
    #[error("{0}")]
    InvalidCard(String),
    #[error("{0}")]
    ExpiredCard(String),
}
