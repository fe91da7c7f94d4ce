//! Payment boundary.
//!
//! Settlement itself belongs to an external collaborator. The registry only
//! needs to know whether a charge of a given amount was settled for a call,
//! and what to write into the ledger when it was.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::PaymentMode;

/// Proof of payment supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentProof {
    /// Who paid (wallet address, account id, ...)
    pub payer: String,
    /// Opaque settlement token
    pub token: String,
    /// Amount the payer authorized; assumed to equal the price when absent
    #[serde(default)]
    pub amount: Option<Decimal>,
}

/// A charge the registry wants settled before running a handler.
#[derive(Debug, Clone)]
pub struct ChargeRequest {
    pub entrypoint: String,
    pub price: Decimal,
    pub call_id: Uuid,
    pub proof: Option<PaymentProof>,
}

/// Evidence of a settled charge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub amount: Decimal,
    pub payer: String,
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PaymentError {
    #[error("payment proof missing")]
    MissingProof,

    #[error("payment proof rejected: {0}")]
    Rejected(String),

    #[error("payment of {offered} does not cover price {price}")]
    Insufficient { offered: Decimal, price: Decimal },
}

/// Verifies and settles charges.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn settle(&self, charge: &ChargeRequest) -> Result<Receipt, PaymentError>;
}

/// Settles every charge at its price. Local development only.
#[derive(Debug, Clone, Default)]
pub struct OpenGateway;

#[async_trait]
impl PaymentGateway for OpenGateway {
    async fn settle(&self, charge: &ChargeRequest) -> Result<Receipt, PaymentError> {
        Ok(Receipt {
            amount: charge.price,
            payer: charge
                .proof
                .as_ref()
                .map(|p| p.payer.clone())
                .unwrap_or_else(|| "anonymous".to_string()),
            reference: format!("open-{}", charge.call_id),
        })
    }
}

/// Requires a well-formed proof whose authorized amount covers the price.
#[derive(Debug, Clone, Default)]
pub struct ProofGateway;

#[async_trait]
impl PaymentGateway for ProofGateway {
    async fn settle(&self, charge: &ChargeRequest) -> Result<Receipt, PaymentError> {
        let proof = charge.proof.as_ref().ok_or(PaymentError::MissingProof)?;

        if proof.payer.trim().is_empty() {
            return Err(PaymentError::Rejected("payer is empty".to_string()));
        }
        if proof.token.trim().is_empty() {
            return Err(PaymentError::Rejected("token is empty".to_string()));
        }

        let offered = proof.amount.unwrap_or(charge.price);
        if offered < charge.price {
            return Err(PaymentError::Insufficient {
                offered,
                price: charge.price,
            });
        }

        Ok(Receipt {
            amount: charge.price,
            payer: proof.payer.clone(),
            reference: token_reference(&proof.token),
        })
    }
}

/// Short, non-reversible reference for a settlement token.
fn token_reference(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("proof-{}", &hex::encode(hasher.finalize())[..16])
}

/// Gateway for the configured payment mode.
pub fn gateway_for(mode: PaymentMode) -> Arc<dyn PaymentGateway> {
    match mode {
        PaymentMode::Open => Arc::new(OpenGateway),
        PaymentMode::Proof => Arc::new(ProofGateway),
    }
}
