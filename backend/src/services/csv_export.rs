//! CSV export of ledger records.
//!
//! Columns are fixed: `direction,amount,timestampISO8601,entrypointKey,metadata`.
//! Rows are written by the `csv` crate with RFC 4180 quoting and CRLF line
//! ends. `metadata` is the record metadata as a JSON object.
//!
//! [`parse_csv`] is strict: every record must re-encode to exactly the bytes
//! it was read from, so stray text around a quoted field is an error rather
//! than being folded into the value.

use chrono::{DateTime, SecondsFormat, Utc};
use csv::{ReaderBuilder, StringRecord, Terminator, WriterBuilder};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::ledger::{Direction, Ledger, Metadata, TransactionRecord, WindowedRecords};

/// Header row of every export.
pub const CSV_HEADER: [&str; 5] = [
    "direction",
    "amount",
    "timestampISO8601",
    "entrypointKey",
    "metadata",
];

/// Rendered CSV plus the number of data rows it holds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsvExport {
    pub csv: String,
    pub rows: usize,
}

/// One parsed data row.
#[derive(Debug, Clone, PartialEq)]
pub struct CsvRow {
    pub direction: Direction,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub entrypoint: String,
    pub metadata: Metadata,
}

impl From<&TransactionRecord> for CsvRow {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            direction: record.direction,
            amount: record.amount,
            timestamp: record.timestamp,
            entrypoint: record.entrypoint.clone(),
            metadata: record.metadata.clone(),
        }
    }
}

/// A row as it appears on the wire, one string per column.
#[derive(Debug, Serialize, Deserialize)]
struct WireRow {
    direction: String,
    amount: String,
    #[serde(rename = "timestampISO8601")]
    timestamp: String,
    #[serde(rename = "entrypointKey")]
    entrypoint: String,
    metadata: String,
}

impl From<&TransactionRecord> for WireRow {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            direction: record.direction.as_str().to_string(),
            amount: record.amount.to_string(),
            timestamp: record
                .timestamp
                .to_rfc3339_opts(SecondsFormat::AutoSi, true),
            entrypoint: record.entrypoint.clone(),
            metadata: serde_json::to_string(&record.metadata)
                .unwrap_or_else(|_| "{}".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("CSV line {line}: {message}")]
pub struct CsvError {
    pub line: u64,
    pub message: String,
}

impl CsvError {
    fn new(line: u64, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }

    fn from_csv(err: csv::Error, fallback_line: u64) -> Self {
        let line = err.position().map_or(fallback_line, |p| p.line());
        Self::new(line, err.to_string())
    }
}

fn writer() -> csv::Writer<Vec<u8>> {
    WriterBuilder::new()
        .has_headers(false)
        .terminator(Terminator::CRLF)
        .from_writer(Vec::new())
}

fn into_string(writer: csv::Writer<Vec<u8>>, line: u64) -> Result<String, CsvError> {
    let bytes = writer
        .into_inner()
        .map_err(|e| CsvError::new(line, e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| CsvError::new(line, e.to_string()))
}

/// Export the trailing `window_ms` of the ledger (whole log when `None`).
pub fn export_csv(ledger: &Ledger, window_ms: Option<u64>) -> Result<CsvExport, CsvError> {
    export_records(&ledger.all_since(window_ms))
}

/// Export an already windowed view.
pub fn export_records(records: &WindowedRecords) -> Result<CsvExport, CsvError> {
    let mut out = writer();
    out.write_record(CSV_HEADER)
        .map_err(|e| CsvError::from_csv(e, 1))?;

    let mut rows = 0;
    for record in records.iter() {
        rows += 1;
        out.serialize(WireRow::from(record))
            .map_err(|e| CsvError::from_csv(e, rows as u64 + 1))?;
    }

    Ok(CsvExport {
        csv: into_string(out, rows as u64 + 1)?,
        rows,
    })
}

/// Parse an export produced by [`export_csv`] back into rows.
///
/// Both CRLF and LF line ends are accepted.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, CsvError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let records = reader
        .records()
        .map(|record| record.map_err(|e| CsvError::from_csv(e, 1)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut starts: Vec<usize> = records.iter().map(record_start).collect();
    starts.push(text.len());
    for (record, span) in records.iter().zip(starts.windows(2)) {
        let raw = text.get(span[0]..span[1]).unwrap_or_default();
        ensure_canonical(record, raw)?;
    }

    let mut records = records.into_iter();
    let header = records
        .next()
        .ok_or_else(|| CsvError::new(1, "missing header row"))?;
    if header.iter().ne(CSV_HEADER) {
        return Err(CsvError::new(
            line_of(&header),
            format!("unexpected header '{}'", header.iter().collect::<Vec<_>>().join(",")),
        ));
    }

    records.map(|record| parse_row(&header, record)).collect()
}

fn record_start(record: &StringRecord) -> usize {
    record
        .position()
        .and_then(|p| usize::try_from(p.byte()).ok())
        .unwrap_or_default()
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map_or(1, |p| p.line())
}

/// Reject records whose source text differs from what the writer would emit.
fn ensure_canonical(record: &StringRecord, raw: &str) -> Result<(), CsvError> {
    let line = line_of(record);
    let mut out = writer();
    out.write_record(record)
        .map_err(|e| CsvError::from_csv(e, line))?;
    let expected = into_string(out, line)?;

    if trim_line_ends(raw) != trim_line_ends(&expected) {
        return Err(CsvError::new(
            line,
            format!("malformed quoting in '{}'", trim_line_ends(raw)),
        ));
    }
    Ok(())
}

/// A canonical record never starts or ends with a bare line break.
fn trim_line_ends(text: &str) -> &str {
    text.trim_matches(|c| c == '\r' || c == '\n')
}

fn parse_row(header: &StringRecord, record: StringRecord) -> Result<CsvRow, CsvError> {
    let line = line_of(&record);
    if record.len() != CSV_HEADER.len() {
        return Err(CsvError::new(
            line,
            format!("expected {} fields, found {}", CSV_HEADER.len(), record.len()),
        ));
    }

    let row: WireRow = record
        .deserialize(Some(header))
        .map_err(|e| CsvError::from_csv(e, line))?;

    Ok(CsvRow {
        direction: row
            .direction
            .parse()
            .map_err(|e: String| CsvError::new(line, e))?,
        amount: Decimal::from_str(&row.amount)
            .map_err(|e| CsvError::new(line, format!("bad amount '{}': {}", row.amount, e)))?,
        timestamp: DateTime::parse_from_rfc3339(&row.timestamp)
            .map_err(|e| {
                CsvError::new(line, format!("bad timestamp '{}': {}", row.timestamp, e))
            })?
            .with_timezone(&Utc),
        entrypoint: row.entrypoint,
        metadata: serde_json::from_str(&row.metadata)
            .map_err(|e| CsvError::new(line, format!("bad metadata: {}", e)))?,
    })
}
