use crate::{
    db::common::InsertPaymentResult,
    db_types::{MerchantId, MerchantStats, NewPayment, Payment, PaymentFailure, PaymentId, OrderId},
};

/// Storage operations for payments, including the two terminal transitions driven by the
/// settlement worker.
#[allow(async_fn_in_trait)]
pub trait PaymentManagement: Clone {
    type Error: std::error::Error;

    /// Inserts a new payment in the `processing` state. An id collision is reported as
    /// [`InsertPaymentResult::DuplicateId`]; the caller regenerates the id.
    async fn insert_payment(
        &self,
        id: &PaymentId,
        payment: &NewPayment,
    ) -> Result<InsertPaymentResult, Self::Error>;

    async fn fetch_payment_by_id(&self, id: &PaymentId) -> Result<Option<Payment>, Self::Error>;

    /// All payments for the merchant, newest first.
    async fn fetch_payments_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Payment>, Self::Error>;

    /// Marks the payment as `success` and its order as `paid` in a single transaction. Only a
    /// payment still in `processing` transitions; anything else leaves both rows untouched.
    async fn mark_payment_success(
        &self,
        id: &PaymentId,
        order_id: &OrderId,
    ) -> Result<(), Self::Error>;

    /// Marks the payment as `failed` with the given error code and description. Only a payment
    /// still in `processing` transitions.
    async fn mark_payment_failed(
        &self,
        id: &PaymentId,
        failure: &PaymentFailure,
    ) -> Result<(), Self::Error>;

    /// Transaction count, successful-amount sum and rounded success rate for a merchant.
    async fn fetch_merchant_stats(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<MerchantStats, Self::Error>;
}
