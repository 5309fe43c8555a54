//! Asynchronous settlement of payments.
//!
//! Payment creation enqueues a [`SettlementJob`] on a bounded channel and returns immediately;
//! a single worker task ([`run_settlement_worker`]) drains the channel and settles each payment
//! concurrently. Only the payment id travels on the queue — the worker re-reads the payment
//! from the store before deciding anything, so the store remains the sole source of truth.
//!
//! The worker's one hard guarantee: every job it picks up ends in a terminal payment state.
//! A declined payment fails with a method-specific code; an unexpected fault fails with
//! `PROCESSING_ERROR`. Nothing stays `processing` once its settlement has run.

use std::{env, time::Duration};

use futures_util::stream::{FuturesUnordered, StreamExt};
use log::*;
use pgw_common::helpers::parse_boolean_flag;
use rand::Rng;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::{
    db::traits::PaymentManagement,
    db_types::{Payment, PaymentFailure, PaymentId, PaymentMethod, PaymentStatusType},
};

pub const DEFAULT_MIN_DELAY_MS: u64 = 5_000;
pub const DEFAULT_MAX_DELAY_MS: u64 = 10_000;
pub const DEFAULT_TEST_DELAY_MS: u64 = 1_000;
pub const DEFAULT_UPI_SUCCESS_RATE: f64 = 0.90;
pub const DEFAULT_CARD_SUCCESS_RATE: f64 = 0.95;
/// Depth of the settlement queue. Enqueueing only waits when this many settlements are backed
/// up behind the worker.
pub const DEFAULT_QUEUE_DEPTH: usize = 1_024;

//--------------------------------------  SettlementConfig   ---------------------------------------------------------
#[derive(Debug, Clone)]
pub enum SettlementConfig {
    /// Fixed delay and forced outcome. Used in test deployments and CI.
    Deterministic { delay: Duration, outcome: bool },
    /// Delay sampled uniformly between the bounds, outcome drawn per method.
    Simulated {
        min_delay: Duration,
        max_delay: Duration,
        upi_success_rate: f64,
        card_success_rate: f64,
    },
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self::Simulated {
            min_delay: Duration::from_millis(DEFAULT_MIN_DELAY_MS),
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
            upi_success_rate: DEFAULT_UPI_SUCCESS_RATE,
            card_success_rate: DEFAULT_CARD_SUCCESS_RATE,
        }
    }
}

impl SettlementConfig {
    pub fn deterministic(delay: Duration, outcome: bool) -> Self {
        Self::Deterministic { delay, outcome }
    }

    /// Builds the configuration from `PGW_*` environment variables. `PGW_TEST_MODE=1` selects
    /// deterministic settlement with `PGW_TEST_PROCESSING_DELAY_MS` and
    /// `PGW_TEST_PAYMENT_SUCCESS`; otherwise the delay bounds and per-method success rates are
    /// read, falling back to the defaults on missing or unparseable values.
    pub fn from_env_or_default() -> Self {
        let test_mode = parse_boolean_flag(env::var("PGW_TEST_MODE").ok(), false);
        if test_mode {
            let delay = env_millis("PGW_TEST_PROCESSING_DELAY_MS", DEFAULT_TEST_DELAY_MS);
            let outcome = parse_boolean_flag(env::var("PGW_TEST_PAYMENT_SUCCESS").ok(), true);
            info!("🏦️ Settlement is deterministic: delay {delay:?}, outcome {outcome}");
            return Self::Deterministic { delay, outcome };
        }
        Self::Simulated {
            min_delay: env_millis("PGW_PROCESSING_DELAY_MIN_MS", DEFAULT_MIN_DELAY_MS),
            max_delay: env_millis("PGW_PROCESSING_DELAY_MAX_MS", DEFAULT_MAX_DELAY_MS),
            upi_success_rate: env_rate("PGW_UPI_SUCCESS_RATE", DEFAULT_UPI_SUCCESS_RATE),
            card_success_rate: env_rate("PGW_CARD_SUCCESS_RATE", DEFAULT_CARD_SUCCESS_RATE),
        }
    }

    /// The delay to wait before deciding the outcome of a settlement.
    pub fn processing_delay(&self) -> Duration {
        match self {
            Self::Deterministic { delay, .. } => *delay,
            Self::Simulated { min_delay, max_delay, .. } => {
                if max_delay <= min_delay {
                    return *min_delay;
                }
                let span = (*max_delay - *min_delay).as_millis() as u64;
                let offset = rand::thread_rng().gen_range(0..=span);
                *min_delay + Duration::from_millis(offset)
            },
        }
    }

    /// Whether the simulated bank approves a payment with the given method.
    pub fn decide_outcome(&self, method: PaymentMethod) -> bool {
        match self {
            Self::Deterministic { outcome, .. } => *outcome,
            Self::Simulated { upi_success_rate, card_success_rate, .. } => {
                let rate = match method {
                    PaymentMethod::Upi => *upi_success_rate,
                    PaymentMethod::Card => *card_success_rate,
                };
                rand::thread_rng().gen_bool(rate.clamp(0.0, 1.0))
            },
        }
    }

    /// Upper bound on the settlement delay. Clients polling for a terminal status can give up
    /// shortly after this has elapsed.
    pub fn max_processing_delay(&self) -> Duration {
        match self {
            Self::Deterministic { delay, .. } => *delay,
            Self::Simulated { max_delay, .. } => *max_delay,
        }
    }
}

fn env_millis(var: &str, default: u64) -> Duration {
    let ms = env::var(var)
        .ok()
        .and_then(|s| {
            s.parse::<u64>()
                .map_err(|e| warn!("🏦️ Invalid value for {var}: {e}. Using the default"))
                .ok()
        })
        .unwrap_or(default);
    Duration::from_millis(ms)
}

fn env_rate(var: &str, default: f64) -> f64 {
    env::var(var)
        .ok()
        .and_then(|s| {
            s.parse::<f64>()
                .map_err(|e| warn!("🏦️ Invalid value for {var}: {e}. Using the default"))
                .ok()
        })
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}

//--------------------------------------   SettlementQueue   ---------------------------------------------------------
/// A settlement request for a single payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettlementJob {
    pub payment_id: PaymentId,
}

impl SettlementJob {
    pub fn for_payment(payment: &Payment) -> Self {
        Self { payment_id: payment.id.clone() }
    }
}

#[derive(Debug, Clone, Error)]
#[error("The settlement queue is closed")]
pub struct SettlementQueueClosed;

/// Producer half of the settlement queue. Cheap to clone; each API instance holds one.
#[derive(Clone)]
pub struct SettlementQueue {
    sender: mpsc::Sender<SettlementJob>,
}

impl SettlementQueue {
    /// Creates the queue, returning the consumer half for [`run_settlement_worker`].
    pub fn new(depth: usize) -> (Self, mpsc::Receiver<SettlementJob>) {
        let (sender, receiver) = mpsc::channel(depth);
        (Self { sender }, receiver)
    }

    pub async fn enqueue(&self, job: SettlementJob) -> Result<(), SettlementQueueClosed> {
        self.sender.send(job).await.map_err(|_| SettlementQueueClosed)
    }
}

//--------------------------------------  settlement worker  ---------------------------------------------------------
/// Consumes settlement jobs until the queue closes, then drains whatever is still in flight.
/// Individual settlements run concurrently, so a long delay on one never holds up the others,
/// and the enqueueing request path never waits for any of them.
pub async fn run_settlement_worker<B>(
    db: B,
    config: SettlementConfig,
    mut jobs: mpsc::Receiver<SettlementJob>,
) where
    B: PaymentManagement + Clone,
{
    let mut in_flight = FuturesUnordered::new();
    loop {
        tokio::select! {
            job = jobs.recv() => match job {
                Some(job) => in_flight.push(settle(db.clone(), job, config.clone())),
                None => break,
            },
            Some(()) = in_flight.next(), if !in_flight.is_empty() => {},
        }
    }
    debug!("🏦️ Settlement queue closed. Draining {} in-flight settlements", in_flight.len());
    while in_flight.next().await.is_some() {}
}

/// Runs one settlement to a terminal state. Never propagates an error: any fault is converted
/// into a failed payment so nothing stays `processing` forever.
async fn settle<B: PaymentManagement>(db: B, job: SettlementJob, config: SettlementConfig) {
    let payment_id = job.payment_id.clone();
    if let Err(e) = try_settle(&db, job, &config).await {
        error!("🏦️ Settlement of payment {payment_id} faulted: {e}");
        if let Err(e) =
            db.mark_payment_failed(&payment_id, &PaymentFailure::processing_error()).await
        {
            error!(
                "🏦️ Payment {payment_id} could not be driven to a terminal state: {e}. Manual \
                 intervention required"
            );
        }
    }
}

#[derive(Debug, Error)]
enum SettlementError {
    #[error("Payment disappeared from the store")]
    PaymentMissing,
    #[error("Database error: {0}")]
    DatabaseError(String),
}

async fn try_settle<B: PaymentManagement>(
    db: &B,
    job: SettlementJob,
    config: &SettlementConfig,
) -> Result<(), SettlementError> {
    tokio::time::sleep(config.processing_delay()).await;
    let payment = db
        .fetch_payment_by_id(&job.payment_id)
        .await
        .map_err(|e| SettlementError::DatabaseError(e.to_string()))?
        .ok_or(SettlementError::PaymentMissing)?;
    if payment.status != PaymentStatusType::Processing {
        debug!("🏦️ Payment {} is already {}. Nothing to do", payment.id, payment.status);
        return Ok(());
    }
    if config.decide_outcome(payment.method) {
        db.mark_payment_success(&payment.id, &payment.order_id)
            .await
            .map_err(|e| SettlementError::DatabaseError(e.to_string()))?;
        info!("🏦️ Payment {} of {} settled successfully", payment.id, payment.amount);
    } else {
        db.mark_payment_failed(&payment.id, &PaymentFailure::declined(payment.method))
            .await
            .map_err(|e| SettlementError::DatabaseError(e.to_string()))?;
        info!("🏦️ Payment {} was declined by the simulated bank", payment.id);
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn deterministic_config_forces_delay_and_outcome() {
        let config = SettlementConfig::deterministic(Duration::from_millis(5), false);
        assert_eq!(config.processing_delay(), Duration::from_millis(5));
        assert_eq!(config.max_processing_delay(), Duration::from_millis(5));
        assert!(!config.decide_outcome(PaymentMethod::Upi));
        assert!(!config.decide_outcome(PaymentMethod::Card));
    }

    #[test]
    fn simulated_delay_stays_within_bounds() {
        let config = SettlementConfig::Simulated {
            min_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(20),
            upi_success_rate: 0.5,
            card_success_rate: 0.5,
        };
        for _ in 0..200 {
            let delay = config.processing_delay();
            assert!(delay >= Duration::from_millis(10));
            assert!(delay <= Duration::from_millis(20));
        }
    }

    #[test]
    fn degenerate_delay_bounds_collapse_to_the_minimum() {
        let config = SettlementConfig::Simulated {
            min_delay: Duration::from_millis(30),
            max_delay: Duration::from_millis(10),
            upi_success_rate: 1.0,
            card_success_rate: 1.0,
        };
        assert_eq!(config.processing_delay(), Duration::from_millis(30));
    }

    #[test]
    fn extreme_success_rates_are_deterministic() {
        let config = SettlementConfig::Simulated {
            min_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(2),
            upi_success_rate: 1.0,
            card_success_rate: 0.0,
        };
        for _ in 0..50 {
            assert!(config.decide_outcome(PaymentMethod::Upi));
            assert!(!config.decide_outcome(PaymentMethod::Card));
        }
    }

    #[tokio::test]
    async fn enqueue_reports_a_closed_queue() {
        let (queue, receiver) = SettlementQueue::new(4);
        drop(receiver);
        let job = SettlementJob { payment_id: PaymentId("pay_gone".to_string()) };
        assert!(queue.enqueue(job).await.is_err());
    }
}
