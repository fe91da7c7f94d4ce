mod support;

use rust_decimal::Decimal;
use serde_json::json;
use std::str::FromStr;
use std::sync::Arc;

use spacex_agent::api::{CallRequest, PaymentProof};
use spacex_agent::config::AgentConfig;
use spacex_agent::ledger::Direction;
use spacex_agent::payments::{OpenGateway, ProofGateway};
use spacex_agent::registry::DispatchError;
use support::{registry_with, spacex_upstream};

fn proof() -> PaymentProof {
    PaymentProof {
        payer: "0xcafe".to_string(),
        token: "settlement-token".to_string(),
        amount: None,
    }
}

#[tokio::test]
async fn test_upcoming_launches_filters_starship() {
    let (registry, _) = registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(OpenGateway));

    let response = registry
        .dispatch(CallRequest::new(
            "upcoming-launches",
            json!({"limit": 2, "rocketType": "starship"}),
        ))
        .await
        .unwrap();

    let output = &response.output;
    assert_eq!(output["total"], 5);
    assert_eq!(output["filtered"], 3);
    assert_eq!(output["returned"], 2);
    assert_eq!(output["launches"][0]["id"], "upcoming-1");
    assert_eq!(output["launches"][1]["id"], "upcoming-3");
    assert_eq!(output["launches"][0]["rocketName"], "Starship");
}

#[tokio::test]
async fn test_unknown_key_is_not_found() {
    let (registry, ledger) =
        registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(OpenGateway));

    let err = registry
        .dispatch(CallRequest::new("mars-colony", json!({})))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        DispatchError::NotFound {
            key: "mars-colony".to_string()
        }
    );
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn test_invalid_input_names_the_field() {
    let (registry, ledger) =
        registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(OpenGateway));

    let err = registry
        .dispatch(CallRequest::new("past-launches", json!({"limit": "lots"})))
        .await
        .unwrap_err();

    match err {
        DispatchError::InvalidInput { errors, .. } => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].field, "limit");
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn test_upstream_500_surfaces_status_without_output() {
    let upstream = spacex_upstream().with_status("/launches/upcoming", 500);
    let (registry, _) = registry_with(&AgentConfig::default(), upstream, Arc::new(OpenGateway));

    let err = registry
        .dispatch(CallRequest::new("upcoming-launches", json!({})))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DispatchError::UpstreamError { status: 500, .. }
    ));
}

#[tokio::test]
async fn test_full_report_aborts_on_first_failure() {
    let upstream = spacex_upstream().with_status("/launchpads", 503);
    let (registry, ledger) = registry_with(&AgentConfig::default(), upstream, Arc::new(OpenGateway));

    let err = registry
        .dispatch(CallRequest::new("full-report", json!({})))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "UPSTREAM_ERROR");
    // The charge settled before the handler ran and stays recorded.
    assert_eq!(ledger.len(), 1);
}

#[tokio::test]
async fn test_proof_mode_requires_payment() {
    let (registry, ledger) =
        registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(ProofGateway));

    let err = registry
        .dispatch(CallRequest::new("rockets", json!({})))
        .await
        .unwrap_err();
    match err {
        DispatchError::PaymentRequired { key, price, .. } => {
            assert_eq!(key, "rockets");
            assert_eq!(price, Decimal::from_str("0.001").unwrap());
        }
        other => panic!("unexpected error: {:?}", other),
    }
    assert!(ledger.is_empty());

    let response = registry
        .dispatch(CallRequest::new("rockets", json!({"activeOnly": true})).with_payment(proof()))
        .await
        .unwrap();
    assert_eq!(response.output["returned"], 1);

    let records: Vec<_> = ledger.all_since(None).iter().cloned().collect();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].direction, Direction::Incoming);
    assert_eq!(records[0].metadata["payer"], "0xcafe");
    assert_eq!(records[0].metadata["call_id"], response.call_id.to_string());
}

#[tokio::test]
async fn test_underpayment_is_rejected() {
    let (registry, ledger) =
        registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(ProofGateway));
    let mut short = proof();
    short.amount = Some(Decimal::from_str("0.005").unwrap());

    let err = registry
        .dispatch(CallRequest::new("full-report", json!({})).with_payment(short))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "PAYMENT_REQUIRED");
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn test_free_entrypoints_skip_the_gateway() {
    let (registry, ledger) =
        registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(ProofGateway));

    for key in ["company-info", "roadster"] {
        let response = registry
            .dispatch(CallRequest::new(key, json!(null)))
            .await
            .unwrap();
        assert!(response.receipt.is_none());
    }
    assert!(ledger.is_empty());
}

#[tokio::test]
async fn test_metered_upstream_cost_is_recorded_as_expense() {
    let config = AgentConfig::from_toml_str("[upstream]\ncost_per_request = \"0.0001\"").unwrap();
    let (registry, ledger) = registry_with(&config, spacex_upstream(), Arc::new(OpenGateway));

    registry
        .dispatch(CallRequest::new("full-report", json!({})))
        .await
        .unwrap();

    let records: Vec<_> = ledger.all_since(None).iter().cloned().collect();
    let incoming = records.iter().filter(|r| r.direction == Direction::Incoming).count();
    let outgoing: Vec<_> = records
        .iter()
        .filter(|r| r.direction == Direction::Outgoing)
        .collect();
    assert_eq!(incoming, 1);
    assert_eq!(outgoing.len(), 5);
    assert!(outgoing.iter().all(|r| r.entrypoint == "full-report"));
}

#[tokio::test]
async fn test_every_catalogue_entrypoint_answers() {
    let (registry, _) = registry_with(&AgentConfig::default(), spacex_upstream(), Arc::new(OpenGateway));
    let keys: Vec<String> = registry
        .definitions()
        .iter()
        .map(|d| d.key.clone())
        .collect();

    for key in keys {
        let result = registry.dispatch(CallRequest::new(&key, json!({}))).await;
        assert!(result.is_ok(), "{} failed: {:?}", key, result.err());
    }
}
