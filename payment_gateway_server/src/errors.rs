use actix_web::{
    error::ResponseError,
    http::{header::ContentType, StatusCode},
    HttpResponse,
};
use log::error;
use payment_gateway_engine::{
    validation::ValidationError,
    MerchantApiError,
    OrderApiError,
    PaymentApiError,
};
use thiserror::Error;

/// HTTP-layer error. Every variant maps to one of the gateway's published error codes and is
/// rendered as the `{"error": {"code", "description"}}` envelope.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Could not initialize server. {0}")]
    InitializeError(String),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidVpa(String),
    #[error("{0}")]
    InvalidCard(String),
    #[error("{0}")]
    ExpiredCard(String),
    #[error("An error occurred on the backend of the server. {0}")]
    BackendError(String),
}

impl ServerError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::BadRequest(_) => "BAD_REQUEST_ERROR",
            Self::AuthenticationError(_) => "AUTHENTICATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND_ERROR",
            Self::InvalidVpa(_) => "INVALID_VPA",
            Self::InvalidCard(_) => "INVALID_CARD",
            Self::ExpiredCard(_) => "EXPIRED_CARD",
            Self::InitializeError(_) | Self::BackendError(_) => "INTERNAL_ERROR",
        }
    }

    // Internal faults keep their detail in the server log; the client gets a generic line.
    fn public_description(&self) -> String {
        match self {
            Self::InitializeError(_) | Self::BackendError(_) => {
                "An unexpected error occurred".to_string()
            },
            other => other.to_string(),
        }
    }
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::InvalidVpa(_) | Self::InvalidCard(_) | Self::ExpiredCard(_) => {
                StatusCode::BAD_REQUEST
            },
            Self::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InitializeError(_) | Self::BackendError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            error!("💻️ Internal error: {self}");
        }
        let body = serde_json::json!({
            "error": { "code": self.error_code(), "description": self.public_description() }
        });
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body.to_string())
    }
}

impl From<ValidationError> for ServerError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidVpa(message) => Self::InvalidVpa(message),
            ValidationError::InvalidCard(message) => Self::InvalidCard(message),
            ValidationError::ExpiredCard(message) => Self::ExpiredCard(message),
        }
    }
}

impl From<OrderApiError> for ServerError {
    fn from(e: OrderApiError) -> Self {
        match e {
            OrderApiError::AmountBelowMinimum => Self::BadRequest(e.to_string()),
            OrderApiError::OrderNotFound => Self::NotFound(e.to_string()),
            OrderApiError::IdentifierSpaceExhausted | OrderApiError::DatabaseError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<PaymentApiError> for ServerError {
    fn from(e: PaymentApiError) -> Self {
        match e {
            PaymentApiError::OrderNotFound | PaymentApiError::PaymentNotFound => {
                Self::NotFound(e.to_string())
            },
            PaymentApiError::OrderAlreadyPaid | PaymentApiError::UnsupportedMethod => {
                Self::BadRequest(e.to_string())
            },
            PaymentApiError::Validation(validation) => validation.into(),
            PaymentApiError::IdentifierSpaceExhausted | PaymentApiError::DatabaseError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}

impl From<MerchantApiError> for ServerError {
    fn from(e: MerchantApiError) -> Self {
        match e {
            MerchantApiError::InvalidCredentials | MerchantApiError::InactiveMerchant => {
                Self::AuthenticationError(e.to_string())
            },
            MerchantApiError::MerchantNotFound => Self::NotFound(e.to_string()),
            MerchantApiError::IdentifierSpaceExhausted | MerchantApiError::DatabaseError(_) => {
                Self::BackendError(e.to_string())
            },
        }
    }
}
