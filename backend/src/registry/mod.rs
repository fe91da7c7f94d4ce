//! Payment-gated entrypoint dispatch.
//!
//! ```text
//! CallRequest {key, input, payment?}
//!        │
//!        ▼
//! ┌──────────────────────────────┐
//! │ 1. lookup definition         │──► NotFound
//! │ 2. validate input contract   │──► InvalidInput
//! │ 3. settle charge (if priced) │──► PaymentRequired
//! │    + append incoming record  │
//! │ 4. run handler               │──► UpstreamError / HandlerError
//! └──────────────┬───────────────┘
//!                ▼
//! CallResponse {key, callId, output}
//! ```

pub mod contract;
pub mod error;

use async_trait::async_trait;
use futures::FutureExt;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::api::{CallRequest, CallResponse};
use crate::ledger::{Ledger, NewTransaction};
use crate::payments::{ChargeRequest, PaymentGateway, Receipt};
use crate::upstream::{FetchError, UpstreamFetcher};

pub use contract::{FieldError, FieldKind, FieldSpec, InputContract, ValidatedInput};
pub use error::{DispatchError, HandlerError, RegistryError};

/// Result type for entrypoint handlers.
pub type HandlerResult = Result<Value, HandlerError>;

/// The code behind an entrypoint.
#[async_trait]
pub trait EntrypointHandler: Send + Sync {
    async fn handle(&self, ctx: HandlerContext, input: ValidatedInput) -> HandlerResult;
}

struct FnHandler<F>(F);

#[async_trait]
impl<F, Fut> EntrypointHandler for FnHandler<F>
where
    F: Fn(HandlerContext, ValidatedInput) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    async fn handle(&self, ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
        (self.0)(ctx, input).await
    }
}

/// Wrap an async function as a handler.
pub fn handler_fn<F, Fut>(f: F) -> Arc<dyn EntrypointHandler>
where
    F: Fn(HandlerContext, ValidatedInput) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    Arc::new(FnHandler(f))
}

/// Everything a handler may touch while serving one call.
#[derive(Clone)]
pub struct HandlerContext {
    key: String,
    call_id: Uuid,
    upstream: Arc<dyn UpstreamFetcher>,
    ledger: Ledger,
    upstream_cost: Option<Decimal>,
}

impl HandlerContext {
    pub fn new(
        key: impl Into<String>,
        upstream: Arc<dyn UpstreamFetcher>,
        ledger: Ledger,
    ) -> Self {
        Self {
            key: key.into(),
            call_id: Uuid::new_v4(),
            upstream,
            ledger,
            upstream_cost: None,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn call_id(&self) -> Uuid {
        self.call_id
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Fetch upstream JSON, recording the metered expense when configured.
    pub async fn fetch_json(&self, path: &str) -> Result<Value, FetchError> {
        let result = self.upstream.fetch_json(path).await;

        let answered = matches!(&result, Ok(_) | Err(FetchError::Status { .. }));
        if let (Some(cost), true) = (self.upstream_cost, answered) {
            self.ledger
                .append_or_abort(
                    NewTransaction::outgoing(&self.key, cost)
                        .with_metadata("call_id", self.call_id.to_string())
                        .with_metadata("path", path),
                )
                .await;
        }

        result
    }

    /// Fetch upstream JSON and decode it into `T`.
    pub async fn fetch<T: DeserializeOwned>(&self, path: &str) -> Result<T, HandlerError> {
        let value = self.fetch_json(path).await?;
        Ok(serde_json::from_value(value)?)
    }
}

/// A named, independently priced operation.
#[derive(Clone)]
pub struct EntrypointDefinition {
    pub key: String,
    pub description: String,
    pub contract: InputContract,
    /// `None` means free.
    pub price: Option<Decimal>,
    pub handler: Arc<dyn EntrypointHandler>,
}

impl EntrypointDefinition {
    /// A free entrypoint taking no input.
    pub fn new(
        key: impl Into<String>,
        description: impl Into<String>,
        handler: Arc<dyn EntrypointHandler>,
    ) -> Self {
        Self {
            key: key.into(),
            description: description.into(),
            contract: InputContract::empty(),
            price: None,
            handler,
        }
    }

    pub fn with_contract(mut self, contract: InputContract) -> Self {
        self.contract = contract;
        self
    }

    pub fn with_price(mut self, price: Option<Decimal>) -> Self {
        self.price = price;
        self
    }

    /// Public description used by the manifest.
    pub fn info(&self) -> EntrypointInfo {
        EntrypointInfo {
            key: self.key.clone(),
            description: self.description.clone(),
            price: self.price,
            input: self.contract.fields().to_vec(),
        }
    }
}

impl fmt::Debug for EntrypointDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntrypointDefinition")
            .field("key", &self.key)
            .field("price", &self.price)
            .field("contract", &self.contract)
            .finish_non_exhaustive()
    }
}

/// Manifest entry for one entrypoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrypointInfo {
    pub key: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    pub input: Vec<FieldSpec>,
}

/// Registry of entrypoints plus the collaborators dispatch needs.
pub struct EntrypointRegistry {
    entries: Vec<EntrypointDefinition>,
    index: HashMap<String, usize>,
    upstream: Arc<dyn UpstreamFetcher>,
    gateway: Arc<dyn PaymentGateway>,
    ledger: Ledger,
    upstream_cost: Option<Decimal>,
}

impl EntrypointRegistry {
    pub fn new(
        upstream: Arc<dyn UpstreamFetcher>,
        gateway: Arc<dyn PaymentGateway>,
        ledger: Ledger,
    ) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            upstream,
            gateway,
            ledger,
            upstream_cost: None,
        }
    }

    /// Record `cost` as an outgoing expense for every upstream request.
    pub fn with_upstream_cost(mut self, cost: Option<Decimal>) -> Self {
        self.upstream_cost = cost;
        self
    }

    /// Register an entrypoint; keys must be unique.
    pub fn register(&mut self, definition: EntrypointDefinition) -> Result<(), RegistryError> {
        if self.index.contains_key(&definition.key) {
            return Err(RegistryError::DuplicateKey(definition.key));
        }
        debug!(key = %definition.key, price = ?definition.price, "Entrypoint registered");
        self.index.insert(definition.key.clone(), self.entries.len());
        self.entries.push(definition);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&EntrypointDefinition> {
        self.index.get(key).map(|&idx| &self.entries[idx])
    }

    /// Definitions in registration order.
    pub fn definitions(&self) -> &[EntrypointDefinition] {
        &self.entries
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    /// Validate, charge, run the handler and return its output unchanged.
    pub async fn dispatch(&self, call: CallRequest) -> Result<CallResponse, DispatchError> {
        let CallRequest {
            key,
            input,
            payment,
        } = call;

        let definition = self
            .get(&key)
            .ok_or_else(|| DispatchError::NotFound { key: key.clone() })?;

        let input = definition
            .contract
            .validate(&input)
            .map_err(|errors| DispatchError::InvalidInput {
                key: key.clone(),
                errors,
            })?;

        let call_id = Uuid::new_v4();
        let receipt = match definition.price {
            Some(price) => Some(self.charge(&key, price, call_id, payment).await?),
            None => None,
        };

        let ctx = HandlerContext {
            key: key.clone(),
            call_id,
            upstream: Arc::clone(&self.upstream),
            ledger: self.ledger.clone(),
            upstream_cost: self.upstream_cost,
        };

        let outcome = AssertUnwindSafe(definition.handler.handle(ctx, input))
            .catch_unwind()
            .await;

        match outcome {
            Ok(Ok(output)) => {
                info!(key = %key, call_id = %call_id, "Entrypoint call completed");
                Ok(CallResponse {
                    key,
                    call_id,
                    output,
                    receipt,
                })
            }
            Ok(Err(err)) => {
                warn!(key = %key, call_id = %call_id, error = %err, "Entrypoint handler failed");
                Err(err.into_dispatch(&key))
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                warn!(key = %key, call_id = %call_id, panic = %message, "Entrypoint handler panicked");
                Err(DispatchError::HandlerError {
                    key,
                    message: format!("handler panicked: {}", message),
                })
            }
        }
    }

    async fn charge(
        &self,
        key: &str,
        price: Decimal,
        call_id: Uuid,
        proof: Option<crate::payments::PaymentProof>,
    ) -> Result<Receipt, DispatchError> {
        let request = ChargeRequest {
            entrypoint: key.to_string(),
            price,
            call_id,
            proof,
        };

        let payment_required = |reason: String| DispatchError::PaymentRequired {
            key: key.to_string(),
            price,
            reason,
        };

        let receipt = self
            .gateway
            .settle(&request)
            .await
            .map_err(|e| payment_required(e.to_string()))?;

        if receipt.amount < price {
            return Err(payment_required(format!(
                "settled amount {} is below the price",
                receipt.amount
            )));
        }

        let id = self
            .ledger
            .append_or_abort(
                NewTransaction::incoming(key, receipt.amount)
                    .with_metadata("call_id", call_id.to_string())
                    .with_metadata("payer", receipt.payer.clone())
                    .with_metadata("reference", receipt.reference.clone()),
            )
            .await;
        info!(
            key = %key,
            call_id = %call_id,
            transaction = %id,
            amount = %receipt.amount,
            "Charge settled"
        );

        Ok(receipt)
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
