//! Service layer over the transaction ledger.
//!
//! Services read the ledger and derive views from it: windowed summaries,
//! transaction listings and CSV exports. They never write.

pub mod analytics;
pub mod csv_export;

pub use analytics::{
    list_transactions, summarize, AnalyticsSummary, TransactionList, DEFAULT_LIST_LIMIT,
    MAX_LIST_LIMIT,
};
pub use csv_export::{export_csv, parse_csv, CsvError, CsvExport, CsvRow, CSV_HEADER};
