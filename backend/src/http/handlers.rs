//! HTTP handlers for the REST API.
//!
//! Each handler translates one request into a registry or ledger call.

use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Path, Query, State},
    http::header,
    response::IntoResponse,
    Json,
};

use super::dto::{
    AgentManifest, CsvQuery, EntrypointListResponse, HealthResponse, InvokeRequest,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{CallRequest, CallResponse, EntrypointInfo};
use crate::services;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        entrypoints: state.registry.definitions().len(),
        transactions: state.ledger().len(),
    }))
}

// =============================================================================
// Discovery
// =============================================================================

/// GET /.well-known/agent.json
///
/// Machine-readable description of every entrypoint, its input and price.
pub async fn manifest(State(state): State<AppState>) -> HandlerResult<AgentManifest> {
    Ok(Json(AgentManifest {
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        description: "Paid access to SpaceX launch, fleet and company data".to_string(),
        entrypoints: entrypoint_infos(&state),
    }))
}

/// GET /v1/entrypoints
pub async fn list_entrypoints(
    State(state): State<AppState>,
) -> HandlerResult<EntrypointListResponse> {
    let entrypoints = entrypoint_infos(&state);
    let total = entrypoints.len();
    Ok(Json(EntrypointListResponse { entrypoints, total }))
}

fn entrypoint_infos(state: &AppState) -> Vec<EntrypointInfo> {
    state
        .registry
        .definitions()
        .iter()
        .map(|definition| definition.info())
        .collect()
}

// =============================================================================
// Invocation
// =============================================================================

/// POST /v1/entrypoints/{key}/invoke
///
/// Body: `{"input": {...}, "payment": {...}}`, both optional.
pub async fn invoke_entrypoint(
    State(state): State<AppState>,
    Path(key): Path<String>,
    body: Bytes,
) -> HandlerResult<CallResponse> {
    let request: InvokeRequest = if body.iter().all(u8::is_ascii_whitespace) {
        InvokeRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {}", e)))?
    };

    let call = CallRequest {
        key,
        input: request.input,
        payment: request.payment,
    };

    let response = state.registry.dispatch(call).await?;
    Ok(Json(response))
}

// =============================================================================
// Analytics
// =============================================================================

/// GET /v1/analytics/transactions.csv?windowMs=
pub async fn download_transactions_csv(
    State(state): State<AppState>,
    query: Result<Query<CsvQuery>, QueryRejection>,
) -> Result<impl IntoResponse, AppError> {
    let Query(query) = query.map_err(|e| AppError::BadRequest(e.body_text()))?;
    if query.window_ms == Some(0) {
        return Err(AppError::BadRequest(
            "windowMs must be greater than zero".to_string(),
        ));
    }

    let export = services::export_csv(state.ledger(), query.window_ms)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        export.csv,
    ))
}
