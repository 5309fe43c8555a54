use std::fmt::Display;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use pgw_common::{Money, Secret};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value as JsonValue;
use sqlx::Type;
use thiserror::Error;

#[cfg(feature = "sqlite")]
use sqlx::{sqlite::SqliteRow, FromRow, Row};

pub const ORDER_ID_PREFIX: &str = "order_";
pub const PAYMENT_ID_PREFIX: &str = "pay_";
pub const MERCHANT_ID_PREFIX: &str = "mer_";

/// The smallest amount (in the smallest currency unit) an order may be created for.
pub const MINIMUM_ORDER_AMOUNT: i64 = 100;

//--------------------------------------      OrderId        ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct OrderId(pub String);

impl FromStr for OrderId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for OrderId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl OrderId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     PaymentId       ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct PaymentId(pub String);

impl FromStr for PaymentId {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.to_string()))
    }
}

impl From<String> for PaymentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl PaymentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------     MerchantId      ---------------------------------------------------------
#[derive(Debug, Clone, PartialEq, Eq, Type, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct MerchantId(pub String);

impl From<String> for MerchantId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl Display for MerchantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl MerchantId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

//--------------------------------------   ConversionError   ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct ConversionError(pub String);

//--------------------------------------   OrderStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatusType {
    /// The order is newly created and no payment has succeeded against it.
    Created,
    /// A payment against the order has settled successfully. Terminal.
    Paid,
}

impl Display for OrderStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatusType::Created => write!(f, "created"),
            OrderStatusType::Paid => write!(f, "paid"),
        }
    }
}

impl FromStr for OrderStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "created" => Ok(Self::Created),
            "paid" => Ok(Self::Paid),
            s => Err(ConversionError(format!("Invalid order status: {s}"))),
        }
    }
}

//-------------------------------------- PaymentStatusType   ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatusType {
    /// The payment is awaiting the simulated bank's verdict. The only non-terminal state.
    Processing,
    /// The bank approved the payment. Terminal.
    Success,
    /// The bank declined the payment, or settlement faulted. Terminal.
    Failed,
}

impl Display for PaymentStatusType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentStatusType::Processing => write!(f, "processing"),
            PaymentStatusType::Success => write!(f, "success"),
            PaymentStatusType::Failed => write!(f, "failed"),
        }
    }
}

impl FromStr for PaymentStatusType {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "processing" => Ok(Self::Processing),
            "success" => Ok(Self::Success),
            "failed" => Ok(Self::Failed),
            s => Err(ConversionError(format!("Invalid payment status: {s}"))),
        }
    }
}

//--------------------------------------   PaymentMethod     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Upi,
    Card,
}

impl Display for PaymentMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentMethod::Upi => write!(f, "upi"),
            PaymentMethod::Card => write!(f, "card"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "upi" => Ok(Self::Upi),
            "card" => Ok(Self::Card),
            s => Err(ConversionError(format!("Invalid payment method: {s}"))),
        }
    }
}

//--------------------------------------    CardNetwork      ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Rupay,
    Unknown,
}

impl Display for CardNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CardNetwork::Visa => write!(f, "visa"),
            CardNetwork::Mastercard => write!(f, "mastercard"),
            CardNetwork::Amex => write!(f, "amex"),
            CardNetwork::Rupay => write!(f, "rupay"),
            CardNetwork::Unknown => write!(f, "unknown"),
        }
    }
}

impl FromStr for CardNetwork {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "visa" => Ok(Self::Visa),
            "mastercard" => Ok(Self::Mastercard),
            "amex" => Ok(Self::Amex),
            "rupay" => Ok(Self::Rupay),
            "unknown" => Ok(Self::Unknown),
            s => Err(ConversionError(format!("Invalid card network: {s}"))),
        }
    }
}

//--------------------------------------      Merchant       ---------------------------------------------------------
#[derive(Debug, Clone)]
pub struct Merchant {
    pub id: MerchantId,
    pub name: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Seed payload for a new merchant. Merchants are created at seeding time and are immutable
/// afterwards, apart from deactivation.
#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub email: String,
    pub api_key: String,
    pub api_secret: Secret<String>,
}

//--------------------------------------        Order        ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub merchant_id: MerchantId,
    pub amount: Money,
    pub currency: String,
    pub receipt: Option<String>,
    #[serde(serialize_with = "notes_or_empty")]
    pub notes: Option<JsonValue>,
    pub status: OrderStatusType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// The dashboard expects `notes` to always be an object.
fn notes_or_empty<S: Serializer>(notes: &Option<JsonValue>, serializer: S) -> Result<S::Ok, S::Error> {
    match notes {
        Some(value) => value.serialize(serializer),
        None => JsonValue::Object(Default::default()).serialize(serializer),
    }
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub merchant_id: MerchantId,
    /// The order total, in the smallest unit of `currency`. Immutable once stored.
    pub amount: Money,
    pub currency: String,
    pub receipt: Option<String>,
    /// Opaque structured metadata supplied by the merchant.
    pub notes: Option<JsonValue>,
}

//--------------------------------------       Payment       ---------------------------------------------------------
#[derive(Debug, Clone, Serialize)]
pub struct Payment {
    pub id: PaymentId,
    pub order_id: OrderId,
    /// Copied from the order at creation for fast scoping. Not part of the public projection.
    #[serde(skip_serializing)]
    pub merchant_id: MerchantId,
    pub amount: Money,
    pub currency: String,
    pub method: PaymentMethod,
    pub status: PaymentStatusType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpa: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_network: Option<CardNetwork>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Insert payload for a payment. Amount and currency are copied from the order; the full card
/// number and CVV never reach this type, only the detected network and last four digits.
#[derive(Debug, Clone)]
pub struct NewPayment {
    pub order_id: OrderId,
    pub merchant_id: MerchantId,
    pub amount: Money,
    pub currency: String,
    pub method: PaymentMethod,
    pub vpa: Option<String>,
    pub card_network: Option<CardNetwork>,
    pub card_last4: Option<String>,
}

//--------------------------------------   PaymentFailure    ---------------------------------------------------------
/// The error code and payer-facing description recorded against a failed payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentFailure {
    pub code: String,
    pub description: String,
}

impl PaymentFailure {
    pub fn declined(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Upi => Self {
                code: "UPI_TRANSACTION_FAILED".to_string(),
                description: "UPI transaction failed. Please try again.".to_string(),
            },
            PaymentMethod::Card => Self {
                code: "CARD_TRANSACTION_FAILED".to_string(),
                description: "Card transaction declined by bank.".to_string(),
            },
        }
    }

    pub fn processing_error() -> Self {
        Self {
            code: "PROCESSING_ERROR".to_string(),
            description: "An error occurred while processing the payment".to_string(),
        }
    }
}

//--------------------------------------   MerchantStats     ---------------------------------------------------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MerchantStats {
    pub total_transactions: i64,
    /// Sum of the amounts of successful payments only.
    pub total_amount: Money,
    /// round(successful / total * 100); 0 when the merchant has no payments at all.
    pub success_rate: i64,
}

//--------------------------------------  sqlite row decoding ---------------------------------------------------------
#[cfg(feature = "sqlite")]
fn decode_err(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(source) }
}

#[cfg(feature = "sqlite")]
impl FromRow<'_, SqliteRow> for Merchant {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            api_key: row.try_get("api_key")?,
            api_secret: Secret::new(row.try_get("api_secret")?),
            is_active: row.try_get("is_active")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(feature = "sqlite")]
impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let status = row
            .try_get::<String, _>("status")?
            .parse::<OrderStatusType>()
            .map_err(|e| decode_err("status", e))?;
        let notes = row
            .try_get::<Option<String>, _>("notes")?
            .map(|raw| serde_json::from_str(&raw))
            .transpose()
            .map_err(|e| decode_err("notes", e))?;
        Ok(Self {
            id: row.try_get("id")?,
            merchant_id: row.try_get("merchant_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            receipt: row.try_get("receipt")?,
            notes,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(feature = "sqlite")]
impl FromRow<'_, SqliteRow> for Payment {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let method = row
            .try_get::<String, _>("method")?
            .parse::<PaymentMethod>()
            .map_err(|e| decode_err("method", e))?;
        let status = row
            .try_get::<String, _>("status")?
            .parse::<PaymentStatusType>()
            .map_err(|e| decode_err("status", e))?;
        let card_network = row
            .try_get::<Option<String>, _>("card_network")?
            .map(|raw| raw.parse::<CardNetwork>())
            .transpose()
            .map_err(|e| decode_err("card_network", e))?;
        Ok(Self {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            merchant_id: row.try_get("merchant_id")?,
            amount: row.try_get("amount")?,
            currency: row.try_get("currency")?,
            method,
            status,
            vpa: row.try_get("vpa")?,
            card_network,
            card_last4: row.try_get("card_last4")?,
            error_code: row.try_get("error_code")?,
            error_description: row.try_get("error_description")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn statuses_round_trip_through_their_string_form() {
        for status in [OrderStatusType::Created, OrderStatusType::Paid] {
            assert_eq!(status.to_string().parse::<OrderStatusType>().unwrap(), status);
        }
        for status in
            [PaymentStatusType::Processing, PaymentStatusType::Success, PaymentStatusType::Failed]
        {
            assert_eq!(status.to_string().parse::<PaymentStatusType>().unwrap(), status);
        }
        assert!("shipped".parse::<OrderStatusType>().is_err());
    }

    #[test]
    fn payment_methods_parse_from_their_wire_form() {
        assert_eq!("upi".parse::<PaymentMethod>().unwrap(), PaymentMethod::Upi);
        assert_eq!("card".parse::<PaymentMethod>().unwrap(), PaymentMethod::Card);
        assert!("emi".parse::<PaymentMethod>().is_err());
    }

    #[test]
    fn payment_projection_omits_unset_optionals() {
        let payment = Payment {
            id: PaymentId("pay_x".into()),
            order_id: OrderId("order_x".into()),
            merchant_id: MerchantId("mer_x".into()),
            amount: Money::from(500),
            currency: "INR".to_string(),
            method: PaymentMethod::Upi,
            status: PaymentStatusType::Processing,
            vpa: Some("alice@upi".to_string()),
            card_network: None,
            card_last4: None,
            error_code: None,
            error_description: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&payment).unwrap();
        assert_eq!(json["vpa"], "alice@upi");
        assert_eq!(json["status"], "processing");
        assert!(json.get("card_network").is_none());
        assert!(json.get("error_code").is_none());
        assert!(json.get("merchant_id").is_none());
    }

    #[test]
    fn order_projection_defaults_notes_to_an_empty_object() {
        let order = Order {
            id: OrderId("order_x".into()),
            merchant_id: MerchantId("mer_x".into()),
            amount: Money::from(500),
            currency: "INR".to_string(),
            receipt: None,
            notes: None,
            status: OrderStatusType::Created,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["notes"], serde_json::json!({}));
        assert_eq!(json["status"], "created");
    }
}
