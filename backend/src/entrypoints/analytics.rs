//! Free entrypoints exposing the agent's own ledger.

use super::to_output;
use crate::registry::{
    handler_fn, EntrypointDefinition, FieldSpec, HandlerContext, HandlerError, HandlerResult,
    InputContract, ValidatedInput,
};
use crate::services::{self, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT};

pub const ANALYTICS_SUMMARY: &str = "analytics-summary";
pub const ANALYTICS_TRANSACTIONS: &str = "analytics-transactions";
pub const ANALYTICS_EXPORT_CSV: &str = "analytics-export-csv";

pub fn definitions() -> Vec<EntrypointDefinition> {
    vec![
        EntrypointDefinition::new(
            ANALYTICS_SUMMARY,
            "Revenue, expense and net totals",
            handler_fn(analytics_summary),
        )
        .with_contract(InputContract::empty().field(window_field())),
        EntrypointDefinition::new(
            ANALYTICS_TRANSACTIONS,
            "Recorded transactions in insertion order",
            handler_fn(analytics_transactions),
        )
        .with_contract(
            InputContract::empty().field(window_field()).field(
                FieldSpec::integer("limit", "Maximum records to return", 1, MAX_LIST_LIMIT as i64)
                    .with_default(DEFAULT_LIST_LIMIT as i64),
            ),
        ),
        EntrypointDefinition::new(
            ANALYTICS_EXPORT_CSV,
            "Recorded transactions as CSV",
            handler_fn(analytics_export_csv),
        )
        .with_contract(InputContract::empty().field(window_field())),
    ]
}

fn window_field() -> FieldSpec {
    FieldSpec::integer(
        "windowMs",
        "Trailing window in milliseconds; whole ledger when absent",
        1,
        i64::MAX,
    )
    .optional()
}

fn window(input: &ValidatedInput) -> Option<u64> {
    input
        .integer("windowMs")
        .and_then(|ms| u64::try_from(ms).ok())
}

async fn analytics_summary(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    to_output(&services::summarize(ctx.ledger(), window(&input)))
}

async fn analytics_transactions(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    to_output(&services::list_transactions(
        ctx.ledger(),
        window(&input),
        input.size("limit"),
    ))
}

async fn analytics_export_csv(ctx: HandlerContext, input: ValidatedInput) -> HandlerResult {
    let export = services::export_csv(ctx.ledger(), window(&input))
        .map_err(|e| HandlerError::failed(e.to_string()))?;
    to_output(&export)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{Ledger, NewTransaction};
    use crate::upstream::StaticFetcher;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::sync::Arc;

    fn ctx(ledger: &Ledger) -> HandlerContext {
        HandlerContext::new("analytics", Arc::new(StaticFetcher::new()), ledger.clone())
    }

    fn validated(index: usize, raw: serde_json::Value) -> ValidatedInput {
        definitions()[index].contract.validate(&raw).unwrap()
    }

    #[tokio::test]
    async fn test_summary_reads_shared_ledger() {
        let ledger = Ledger::new();
        ledger
            .record(NewTransaction::incoming("rockets", Decimal::new(1, 3)))
            .unwrap();

        let output = analytics_summary(ctx(&ledger), validated(0, json!({"windowMs": 60000})))
            .await
            .unwrap();
        assert_eq!(output["incomingTotal"], "0.001");
        assert_eq!(output["windowMs"], 60000);
    }

    #[tokio::test]
    async fn test_transactions_default_limit() {
        let ledger = Ledger::new();
        for _ in 0..3 {
            ledger
                .record(NewTransaction::incoming("rockets", Decimal::new(1, 3)))
                .unwrap();
        }

        let output = analytics_transactions(ctx(&ledger), validated(1, json!({})))
            .await
            .unwrap();
        assert_eq!(output["limit"], 100);
        assert_eq!(output["returned"], 3);
        assert_eq!(output["transactions"][2]["id"], 2);
    }

    #[tokio::test]
    async fn test_export_returns_csv_and_row_count() {
        let ledger = Ledger::new();
        ledger
            .record(NewTransaction::outgoing("full-report", Decimal::new(5, 4)))
            .unwrap();

        let output = analytics_export_csv(ctx(&ledger), validated(2, json!(null)))
            .await
            .unwrap();
        assert_eq!(output["rows"], 1);
        assert!(output["csv"]
            .as_str()
            .unwrap()
            .starts_with("direction,amount,timestampISO8601,entrypointKey,metadata"));
    }

    #[test]
    fn test_zero_window_is_rejected() {
        let errors = definitions()[0]
            .contract
            .validate(&json!({"windowMs": 0}))
            .unwrap_err();
        assert_eq!(errors[0].field, "windowMs");
    }
}
