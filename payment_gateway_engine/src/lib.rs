//! Sandbox Payment Gateway Engine
//!
//! The engine contains the core logic of the sandbox payment gateway: merchants create orders,
//! payers submit UPI or card payments against them, and a simulated bank asynchronously settles
//! each payment to a terminal state. It is front-end agnostic; the HTTP server crate is a thin
//! adapter over the APIs exposed here.
//!
//! The crate is divided into three main sections:
//! 1. Database management and control ([`mod@db_types`] and the storage traits). SQLite is the
//!    supported backend. You should never need to access the database directly; use the public
//!    APIs instead. The exception is the data types used in the database, which are public.
//! 2. The engine public API ([`OrderApi`], [`PaymentFlowApi`], [`MerchantApi`]). These wrap a
//!    storage backend and implement the order, payment and merchant flows, including identifier
//!    generation and input validation.
//! 3. The settlement pipeline ([`mod@settlement`]). Payment creation enqueues a job on a bounded
//!    queue; a single worker task drains the queue and settles payments concurrently after a
//!    (configurable) simulated bank delay. Every payment ends up in a terminal state, even when
//!    settlement itself faults.
mod db;

pub mod db_types;
pub mod helpers;
mod pge_api;
pub mod settlement;
pub mod validation;

#[cfg(feature = "sqlite")]
pub use db::sqlite::{SqliteDatabase, SqliteDatabaseError};
pub use db::{
    common::{InsertMerchantResult, InsertOrderResult, InsertPaymentResult},
    traits::{MerchantManagement, OrderManagement, PaymentManagement},
};
pub use pge_api::{
    errors::{MerchantApiError, OrderApiError, PaymentApiError},
    merchant_api::{
        MerchantApi,
        TEST_MERCHANT_API_KEY,
        TEST_MERCHANT_API_SECRET,
        TEST_MERCHANT_EMAIL,
    },
    order_api::OrderApi,
    order_objects,
    payment_api::PaymentFlowApi,
    payment_objects,
};
