//! Error types for registration, dispatch and handlers.

use rust_decimal::Decimal;

use super::contract::FieldError;
use crate::upstream::FetchError;

/// Registration failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("Entrypoint '{0}' is already registered")]
    DuplicateKey(String),
}

/// Structured dispatch failure returned to callers.
///
/// None of these is fatal; the caller decides whether to retry.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DispatchError {
    /// No entrypoint is registered under `key`.
    #[error("Unknown entrypoint '{key}'")]
    NotFound { key: String },

    /// The input did not satisfy the entrypoint's contract.
    #[error("Invalid input for '{key}': {}", join_errors(.errors))]
    InvalidInput { key: String, errors: Vec<FieldError> },

    /// A priced entrypoint was called without a settled charge.
    #[error("Payment of {price} required for '{key}': {reason}")]
    PaymentRequired {
        key: String,
        price: Decimal,
        reason: String,
    },

    /// The upstream data API answered with a non-success status.
    #[error("Upstream error for '{key}' (HTTP {status}): {message}")]
    UpstreamError {
        key: String,
        status: u16,
        message: String,
    },

    /// Anything else that went wrong inside the handler.
    #[error("Handler for '{key}' failed: {message}")]
    HandlerError { key: String, message: String },
}

impl DispatchError {
    /// Stable error code for programmatic handling.
    pub fn code(&self) -> &'static str {
        match self {
            DispatchError::NotFound { .. } => "NOT_FOUND",
            DispatchError::InvalidInput { .. } => "INVALID_INPUT",
            DispatchError::PaymentRequired { .. } => "PAYMENT_REQUIRED",
            DispatchError::UpstreamError { .. } => "UPSTREAM_ERROR",
            DispatchError::HandlerError { .. } => "HANDLER_ERROR",
        }
    }

    pub fn key(&self) -> &str {
        match self {
            DispatchError::NotFound { key }
            | DispatchError::InvalidInput { key, .. }
            | DispatchError::PaymentRequired { key, .. }
            | DispatchError::UpstreamError { key, .. }
            | DispatchError::HandlerError { key, .. } => key,
        }
    }
}

fn join_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Failure raised inside an entrypoint handler.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Upstream(#[from] FetchError),

    #[error("{0}")]
    Failed(String),
}

impl HandlerError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Attach the entrypoint key and map into the caller-facing taxonomy.
    pub fn into_dispatch(self, key: &str) -> DispatchError {
        match self {
            HandlerError::Upstream(FetchError::Status { status, url }) => {
                DispatchError::UpstreamError {
                    key: key.to_string(),
                    status,
                    message: format!("upstream returned HTTP {} for {}", status, url),
                }
            }
            HandlerError::Upstream(other) => DispatchError::HandlerError {
                key: key.to_string(),
                message: other.to_string(),
            },
            HandlerError::Failed(message) => DispatchError::HandlerError {
                key: key.to_string(),
                message,
            },
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Failed(format!("Unexpected upstream payload: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_maps_to_upstream_error() {
        let err = HandlerError::from(FetchError::Status {
            status: 500,
            url: "/launches/upcoming".to_string(),
        })
        .into_dispatch("upcoming-launches");

        assert!(matches!(
            err,
            DispatchError::UpstreamError { status: 500, .. }
        ));
        assert_eq!(err.code(), "UPSTREAM_ERROR");
        assert_eq!(err.key(), "upcoming-launches");
    }

    #[test]
    fn test_timeout_maps_to_handler_error_with_message() {
        let err = HandlerError::from(FetchError::Timeout {
            url: "/rockets".to_string(),
        })
        .into_dispatch("rockets");

        match err {
            DispatchError::HandlerError { message, .. } => assert!(message.contains("/rockets")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_input_message_lists_fields() {
        let err = DispatchError::InvalidInput {
            key: "rockets".to_string(),
            errors: vec![
                FieldError::new("limit", "must be between 1 and 50"),
                FieldError::new("activeOnly", "expected a boolean"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Invalid input for 'rockets': limit: must be between 1 and 50; activeOnly: expected a boolean"
        );
    }
}
