//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::registry::DispatchError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional structured details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Structured failure from the registry
    Dispatch(DispatchError),
    /// Malformed request before it reached the registry
    BadRequest(String),
    /// Failure outside the registry
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Dispatch(DispatchError::NotFound { .. }) => StatusCode::NOT_FOUND,
            AppError::Dispatch(DispatchError::InvalidInput { .. }) => StatusCode::BAD_REQUEST,
            AppError::Dispatch(DispatchError::PaymentRequired { .. }) => {
                StatusCode::PAYMENT_REQUIRED
            }
            AppError::Dispatch(DispatchError::UpstreamError { .. }) => StatusCode::BAD_GATEWAY,
            AppError::Dispatch(DispatchError::HandlerError { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = match self {
            AppError::Dispatch(err) => {
                let body = ApiError::new(err.code(), err.to_string());
                match err {
                    DispatchError::InvalidInput { errors, .. } => {
                        body.with_details(json!({ "errors": errors }))
                    }
                    DispatchError::PaymentRequired { price, .. } => {
                        body.with_details(json!({ "price": price }))
                    }
                    DispatchError::UpstreamError { status, .. } => {
                        body.with_details(json!({ "upstreamStatus": status }))
                    }
                    _ => body,
                }
            }
            AppError::BadRequest(msg) => ApiError::new("BAD_REQUEST", msg),
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                ApiError::new("INTERNAL_ERROR", msg)
            }
        };

        (status, Json(error)).into_response()
    }
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::Dispatch(err)
    }
}
