//! Public call boundary of the agent.
//!
//! A caller sends a [`CallRequest`] and receives either a [`CallResponse`]
//! or a [`DispatchError`](crate::registry::DispatchError). Routing and HTTP
//! binding sit outside this contract.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

pub use crate::ledger::{Direction, TransactionId, TransactionRecord};
pub use crate::payments::{PaymentProof, Receipt};
pub use crate::registry::{EntrypointInfo, FieldError};
pub use crate::services::analytics::{AnalyticsSummary, TransactionList};

/// A structured entrypoint invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallRequest {
    pub key: String,
    /// Untyped input; validated against the entrypoint contract
    #[serde(default)]
    pub input: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentProof>,
}

impl CallRequest {
    pub fn new(key: impl Into<String>, input: Value) -> Self {
        Self {
            key: key.into(),
            input,
            payment: None,
        }
    }

    pub fn with_payment(mut self, payment: PaymentProof) -> Self {
        self.payment = Some(payment);
        self
    }
}

/// Successful entrypoint result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallResponse {
    pub key: String,
    pub call_id: Uuid,
    /// Handler output, unchanged
    pub output: Value,
    /// Settlement receipt for priced entrypoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}
