use crate::db_types::{Merchant, Order, Payment};

/// Outcome of an atomic order insert. `DuplicateId` signals that the generated identifier
/// collided with an existing row; the caller should regenerate and try again.
#[derive(Debug, Clone)]
pub enum InsertOrderResult {
    Inserted(Order),
    DuplicateId,
}

/// Outcome of an atomic payment insert. See [`InsertOrderResult`].
#[derive(Debug, Clone)]
pub enum InsertPaymentResult {
    Inserted(Payment),
    DuplicateId,
}

/// Outcome of an atomic merchant insert. See [`InsertOrderResult`].
#[derive(Debug, Clone)]
pub enum InsertMerchantResult {
    Inserted(Merchant),
    DuplicateId,
}
