//! Router configuration for the HTTP API.
//!
//! This module sets up all routes, middleware (CORS, compression, tracing),
//! and creates the axum router ready for serving.

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers;
use super::state::AppState;

/// Create the main application router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new()
        .route("/entrypoints", get(handlers::list_entrypoints))
        .route("/entrypoints/{key}/invoke", post(handlers::invoke_entrypoint))
        .route(
            "/analytics/transactions.csv",
            get(handlers::download_transactions_csv),
        );

    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/.well-known/agent.json", get(handlers::manifest))
        .nest("/v1", api_v1)
        .layer(DefaultBodyLimit::max(64 * 1024))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AgentConfig;
    use crate::entrypoints::build_registry;
    use crate::ledger::Ledger;
    use crate::payments::{OpenGateway, PaymentGateway, ProofGateway};
    use crate::upstream::StaticFetcher;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    fn upstream() -> StaticFetcher {
        StaticFetcher::new()
            .with_json("/company", json!({"name": "SpaceX", "founded": 2002}))
            .with_json("/rockets", json!([{"id": "r1", "name": "Falcon 9", "active": true}]))
            .with_status("/launches/latest", 500)
    }

    fn app_with(gateway: Arc<dyn PaymentGateway>) -> (Router, Ledger) {
        let ledger = Ledger::new();
        let registry = build_registry(
            &AgentConfig::default(),
            Arc::new(upstream()),
            gateway,
            ledger.clone(),
        )
        .unwrap();
        (create_router(AppState::new(registry)), ledger)
    }

    fn app() -> (Router, Ledger) {
        app_with(Arc::new(OpenGateway))
    }

    fn invoke(key: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/v1/entrypoints/{}/invoke", key))
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let (app, _) = app();
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["entrypoints"], 13);
    }

    #[tokio::test]
    async fn test_manifest_lists_prices_and_inputs() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/.well-known/agent.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        let entrypoints = body["entrypoints"].as_array().unwrap();
        let upcoming = entrypoints
            .iter()
            .find(|e| e["key"] == "upcoming-launches")
            .unwrap();
        assert_eq!(upcoming["price"], "0.002");
        assert_eq!(upcoming["input"][0]["name"], "limit");
        let company = entrypoints.iter().find(|e| e["key"] == "company-info").unwrap();
        assert!(company.get("price").is_none());
    }

    #[tokio::test]
    async fn test_invoke_free_entrypoint() {
        let (app, ledger) = app();
        let response = app.oneshot(invoke("company-info", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["key"], "company-info");
        assert_eq!(body["output"]["name"], "SpaceX");
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_invoke_with_empty_body() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/entrypoints/rockets/invoke")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["output"]["returned"], 1);
        assert_eq!(body["receipt"]["amount"], "0.001");
    }

    #[tokio::test]
    async fn test_unknown_entrypoint_is_404() {
        let (app, _) = app();
        let response = app.oneshot(invoke("moon-base", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(response).await["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_invalid_input_is_400_with_field_errors() {
        let (app, _) = app();
        let response = app
            .oneshot(invoke("upcoming-launches", json!({"input": {"limit": 500}})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "INVALID_INPUT");
        assert_eq!(body["details"]["errors"][0]["field"], "limit");
    }

    #[tokio::test]
    async fn test_malformed_body_is_400() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/v1/entrypoints/rockets/invoke")
                    .body(Body::from("{not json"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_missing_payment_is_402() {
        let (app, ledger) = app_with(Arc::new(ProofGateway));
        let response = app.oneshot(invoke("rockets", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
        let body = json_body(response).await;
        assert_eq!(body["code"], "PAYMENT_REQUIRED");
        assert_eq!(body["details"]["price"], "0.001");
        assert!(ledger.is_empty());
    }

    #[tokio::test]
    async fn test_paid_call_with_proof() {
        let (app, ledger) = app_with(Arc::new(ProofGateway));
        let response = app
            .oneshot(invoke(
                "rockets",
                json!({"input": {"activeOnly": true}, "payment": {"payer": "0xabc", "token": "tok"}}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ledger.len(), 1);
    }

    #[tokio::test]
    async fn test_upstream_failure_is_502() {
        let (app, _) = app();
        let response = app.oneshot(invoke("latest-launch", json!({}))).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = json_body(response).await;
        assert_eq!(body["code"], "UPSTREAM_ERROR");
        assert_eq!(body["details"]["upstreamStatus"], 500);
    }

    #[tokio::test]
    async fn test_csv_download() {
        let (app, ledger) = app();
        ledger
            .record(crate::ledger::NewTransaction::incoming(
                "rockets",
                rust_decimal::Decimal::new(1, 3),
            ))
            .unwrap();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/analytics/transactions.csv?windowMs=60000")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/csv; charset=utf-8"
        );
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(bytes.to_vec()).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.lines().nth(1).unwrap().starts_with("incoming,0.001,"));
    }

    #[tokio::test]
    async fn test_csv_rejects_zero_window() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/analytics/transactions.csv?windowMs=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_csv_non_numeric_window_gets_json_error() {
        let (app, _) = app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/v1/analytics/transactions.csv?windowMs=soon")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["code"], "BAD_REQUEST");
        assert!(!body["message"].as_str().unwrap().is_empty());
    }
}
