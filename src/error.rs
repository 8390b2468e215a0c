use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    /// Merchant credentials are missing or unusable. Blocks checkout.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network failure or timeout talking to the payment provider.
    #[error("Payment provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The provider refused the request (bad amount, currency, card, ...).
    #[error("Payment provider rejected request ({code}): {message}")]
    ProviderRejected { code: String, message: String },

    /// The order could not be updated after the intent was created.
    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Template error: {0}")]
    Template(#[from] tera::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ProviderUnavailable(_) => StatusCode::BAD_GATEWAY,
            AppError::ProviderRejected { .. } => StatusCode::PAYMENT_REQUIRED,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Persistence(_)
            | AppError::Database(_)
            | AppError::Pool(_)
            | AppError::Template(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Whether the shopper can reasonably try again by re-submitting checkout.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::ProviderUnavailable(_))
    }

    /// Message safe to show the shopper on the checkout page.
    pub fn shopper_message(&self) -> String {
        match self {
            AppError::Configuration(_) => {
                "This payment method is not available right now.".to_string()
            }
            AppError::ProviderUnavailable(_) => {
                "The payment service could not be reached. Please try again.".to_string()
            }
            AppError::ProviderRejected { message, .. } => message.clone(),
            AppError::NotFound(msg) | AppError::BadRequest(msg) => msg.clone(),
            _ => "Payment could not be processed.".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let (error, code, details) = match &self {
            AppError::Configuration(msg) => ("Payment method not configured", None, Some(msg.clone())),
            AppError::ProviderUnavailable(_) => ("Payment provider unavailable", None, None),
            AppError::ProviderRejected { code, message } => {
                ("Payment rejected", Some(code.clone()), Some(message.clone()))
            }
            AppError::NotFound(msg) => ("Not found", None, Some(msg.clone())),
            AppError::BadRequest(msg) => ("Bad request", None, Some(msg.clone())),
            _ => ("Internal server error", None, None),
        };

        if status.is_server_error() {
            tracing::error!("{}", self);
        }

        (
            status,
            Json(ErrorBody {
                error,
                code,
                details,
            }),
        )
            .into_response()
    }
}
