//! Windowed aggregation over the transaction ledger.
//!
//! Totals are recomputed from the records on every call using exact decimal
//! arithmetic. Nothing here is cached.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::{Direction, Ledger, TransactionRecord, WindowedRecords};

/// Default number of records returned by [`list_transactions`].
pub const DEFAULT_LIST_LIMIT: usize = 100;

/// Hard cap on records returned by [`list_transactions`].
pub const MAX_LIST_LIMIT: usize = 1000;

/// Per-direction totals over a window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub incoming_total: Decimal,
    pub outgoing_total: Decimal,
    /// `incoming_total - outgoing_total`
    pub net_total: Decimal,
    pub incoming_count: usize,
    pub outgoing_count: usize,
    /// Window used, `None` for the whole log
    pub window_ms: Option<u64>,
}

/// A page of windowed records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionList {
    /// Records inside the window before truncation
    pub total: usize,
    pub returned: usize,
    pub limit: usize,
    pub window_ms: Option<u64>,
    pub transactions: Vec<TransactionRecord>,
}

/// Summarize the trailing `window_ms` of the ledger (whole log when `None`).
pub fn summarize(ledger: &Ledger, window_ms: Option<u64>) -> AnalyticsSummary {
    summarize_records(&ledger.all_since(window_ms))
}

/// Summarize an already windowed view.
pub fn summarize_records(records: &WindowedRecords) -> AnalyticsSummary {
    let mut incoming_total = Decimal::ZERO;
    let mut outgoing_total = Decimal::ZERO;
    let mut incoming_count = 0;
    let mut outgoing_count = 0;

    for record in records.iter() {
        match record.direction {
            Direction::Incoming => {
                incoming_total += record.amount;
                incoming_count += 1;
            }
            Direction::Outgoing => {
                outgoing_total += record.amount;
                outgoing_count += 1;
            }
        }
    }

    AnalyticsSummary {
        incoming_total,
        outgoing_total,
        net_total: incoming_total - outgoing_total,
        incoming_count,
        outgoing_count,
        window_ms: records.window_ms(),
    }
}

/// Windowed records in insertion order, truncated to `limit`.
///
/// # Arguments
/// * `limit` - Maximum records to return (default 100, capped at 1000)
pub fn list_transactions(
    ledger: &Ledger,
    window_ms: Option<u64>,
    limit: Option<usize>,
) -> TransactionList {
    list_records(&ledger.all_since(window_ms), limit)
}

/// Same as [`list_transactions`] over an already windowed view.
pub fn list_records(records: &WindowedRecords, limit: Option<usize>) -> TransactionList {
    let limit = limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT);
    let total = records.count();
    let transactions: Vec<TransactionRecord> = records.iter().take(limit).cloned().collect();

    TransactionList {
        total,
        returned: transactions.len(),
        limit,
        window_ms: records.window_ms(),
        transactions,
    }
}
