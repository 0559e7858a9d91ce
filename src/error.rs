use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum LimitterError {
    #[error("{0}")]
    Validation(String),

    #[error("Payment gateway error: {0}")]
    PaymentGateway(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Authentication required")]
    Unauthorized,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for LimitterError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();

        let (status, error_code) = match &self {
            LimitterError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            LimitterError::PaymentGateway(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "PAYMENT_GATEWAY_ERROR")
            }
            LimitterError::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            LimitterError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, "STORE_ERROR"),
            LimitterError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            LimitterError::AdminRequired => (StatusCode::FORBIDDEN, "ADMIN_REQUIRED"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}

impl From<redis::RedisError> for LimitterError {
    fn from(e: redis::RedisError) -> Self {
        LimitterError::Store(e.to_string())
    }
}
