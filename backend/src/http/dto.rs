//! Data Transfer Objects for the HTTP API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use crate::api::{CallResponse, EntrypointInfo, PaymentProof};

/// Body of `POST /v1/entrypoints/{key}/invoke`.
///
/// An empty body is treated as `{}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InvokeRequest {
    #[serde(default)]
    pub input: Value,
    #[serde(default)]
    pub payment: Option<PaymentProof>,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub entrypoints: usize,
    pub transactions: usize,
}

/// Agent manifest served at `/.well-known/agent.json`.
#[derive(Debug, Clone, Serialize)]
pub struct AgentManifest {
    pub name: String,
    pub version: String,
    pub description: String,
    pub entrypoints: Vec<EntrypointInfo>,
}

/// Response for `GET /v1/entrypoints`.
#[derive(Debug, Clone, Serialize)]
pub struct EntrypointListResponse {
    pub entrypoints: Vec<EntrypointInfo>,
    pub total: usize,
}

/// Query string of the CSV download.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CsvQuery {
    #[serde(default)]
    pub window_ms: Option<u64>,
}
