//! Error types for ledger storage.

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Error type for ledger operations.
///
/// Both variants are unrecoverable: a ledger that cannot persist or reload
/// its records cannot be trusted for financial totals.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// Writing to or reading from the journal failed.
    #[error("Storage error: {message} [path={path}]")]
    Storage { message: String, path: String },

    /// The journal exists but does not form a valid record chain.
    #[error("Corrupt journal: {message} [path={path}, line={line}]")]
    Corrupt {
        message: String,
        path: String,
        line: usize,
    },
}

impl LedgerError {
    /// Create a storage error.
    pub fn storage(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a corruption error for a 1-based journal line.
    pub fn corrupt(message: impl Into<String>, path: impl Into<String>, line: usize) -> Self {
        Self::Corrupt {
            message: message.into(),
            path: path.into(),
            line,
        }
    }
}
