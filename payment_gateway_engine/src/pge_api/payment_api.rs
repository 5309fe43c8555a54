use std::fmt::Debug;

use log::*;

use crate::{
    db::{
        common::InsertPaymentResult,
        traits::{OrderManagement, PaymentManagement},
    },
    db_types::{
        MerchantId,
        MerchantStats,
        NewPayment,
        OrderStatusType,
        Payment,
        PaymentFailure,
        PaymentId,
        PaymentMethod,
        PAYMENT_ID_PREFIX,
    },
    helpers::{random_id, MAX_ID_ATTEMPTS},
    pge_api::{errors::PaymentApiError, payment_objects::NewPaymentRequest},
    settlement::{SettlementJob, SettlementQueue},
    validation::{validate_card, validate_vpa, ValidationError},
};

/// `PaymentFlowApi` is the primary API for creating payments against orders and handing them to
/// the asynchronous settlement pipeline, plus the read side used by polling clients.
pub struct PaymentFlowApi<B> {
    db: B,
    queue: SettlementQueue,
}

impl<B> Debug for PaymentFlowApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PaymentFlowApi")
    }
}

impl<B> PaymentFlowApi<B>
where B: OrderManagement + PaymentManagement
{
    pub fn new(db: B, queue: SettlementQueue) -> Self {
        Self { db, queue }
    }

    /// Creates a payment against an order and enqueues its settlement.
    ///
    /// The synchronous gates run in a fixed sequence: the order must exist (and belong to the
    /// caller when a merchant is supplied; the public checkout path passes `None`), must not
    /// already be paid, the method must be known, and the method-specific details must
    /// validate. Only then is a row written, in the `processing` state, with the amount and
    /// currency copied from the order. The caller gets the new payment back immediately and
    /// discovers the settlement outcome by polling.
    pub async fn create_payment(
        &self,
        merchant_id: Option<&MerchantId>,
        request: NewPaymentRequest,
    ) -> Result<Payment, PaymentApiError> {
        let order = self
            .db
            .fetch_order_by_id(&request.order_id)
            .await
            .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))?
            .ok_or(PaymentApiError::OrderNotFound)?;
        if let Some(merchant_id) = merchant_id {
            if order.merchant_id != *merchant_id {
                return Err(PaymentApiError::OrderNotFound);
            }
        }
        if order.status == OrderStatusType::Paid {
            return Err(PaymentApiError::OrderAlreadyPaid);
        }
        let method =
            request.method.parse::<PaymentMethod>().map_err(|_| PaymentApiError::UnsupportedMethod)?;
        let mut new_payment = NewPayment {
            order_id: order.id.clone(),
            merchant_id: order.merchant_id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            method,
            vpa: None,
            card_network: None,
            card_last4: None,
        };
        match method {
            PaymentMethod::Upi => {
                let vpa = request
                    .vpa
                    .ok_or_else(|| ValidationError::InvalidVpa("VPA is required".to_string()))?;
                validate_vpa(&vpa)?;
                new_payment.vpa = Some(vpa);
            },
            PaymentMethod::Card => {
                let card = request.card.ok_or_else(|| {
                    ValidationError::InvalidCard("Card details are required".to_string())
                })?;
                let valid = validate_card(&card)?;
                new_payment.card_network = Some(valid.network);
                new_payment.card_last4 = Some(valid.last4);
            },
        }
        let payment = self.insert_with_fresh_id(&new_payment).await?;
        if let Err(e) = self.queue.enqueue(SettlementJob::for_payment(&payment)).await {
            // The worker is gone. Drive the payment to a terminal state rather than leaving it
            // stuck in `processing` with nobody to settle it.
            error!("🔄️💰️ Could not queue settlement for payment {}: {e}", payment.id);
            self.db
                .mark_payment_failed(&payment.id, &PaymentFailure::processing_error())
                .await
                .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))?;
        }
        debug!(
            "🔄️💰️ Payment {} of {} created against order {}",
            payment.id, payment.amount, payment.order_id
        );
        Ok(payment)
    }

    async fn insert_with_fresh_id(&self, payment: &NewPayment) -> Result<Payment, PaymentApiError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = PaymentId::from(random_id(PAYMENT_ID_PREFIX));
            match self
                .db
                .insert_payment(&id, payment)
                .await
                .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))?
            {
                InsertPaymentResult::Inserted(payment) => return Ok(payment),
                InsertPaymentResult::DuplicateId => {
                    warn!("🔄️💰️ Payment id {id} is already taken. Generating a new one");
                },
            }
        }
        error!("🔄️💰️ No unused payment id found after {MAX_ID_ATTEMPTS} attempts");
        Err(PaymentApiError::IdentifierSpaceExhausted)
    }

    /// Fetches a payment on behalf of a merchant. A payment belonging to another merchant is
    /// reported as not found.
    pub async fn fetch_payment_for_merchant(
        &self,
        id: &PaymentId,
        merchant_id: &MerchantId,
    ) -> Result<Payment, PaymentApiError> {
        let payment = self.fetch_payment(id).await?;
        if payment.merchant_id != *merchant_id {
            return Err(PaymentApiError::PaymentNotFound);
        }
        Ok(payment)
    }

    /// Fetches a payment without an ownership check. Used by the public checkout path to poll
    /// for the settlement outcome.
    pub async fn fetch_payment(&self, id: &PaymentId) -> Result<Payment, PaymentApiError> {
        self.db
            .fetch_payment_by_id(id)
            .await
            .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))?
            .ok_or(PaymentApiError::PaymentNotFound)
    }

    /// All of the merchant's payments, newest first.
    pub async fn payments_for_merchant(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Payment>, PaymentApiError> {
        self.db
            .fetch_payments_for_merchant(merchant_id)
            .await
            .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))
    }

    /// Aggregate statistics for the merchant dashboard.
    pub async fn merchant_stats(
        &self,
        merchant_id: &MerchantId,
    ) -> Result<MerchantStats, PaymentApiError> {
        self.db
            .fetch_merchant_stats(merchant_id)
            .await
            .map_err(|e| PaymentApiError::DatabaseError(e.to_string()))
    }
}
