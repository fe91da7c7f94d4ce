//! JSON-lines journal that persists ledger appends.
//!
//! Every line holds one record plus a SHA-256 digest chained to the digest
//! of the previous line, so truncation in the middle, reordering or edits
//! are detected when the journal is replayed.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use super::error::{LedgerError, LedgerResult};
use super::record::{TransactionId, TransactionRecord};

/// Digest preceding the first journal line.
pub const GENESIS_DIGEST: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

#[derive(Debug, Serialize, Deserialize)]
struct JournalLine {
    prev: String,
    digest: String,
    record: TransactionRecord,
}

/// Calculate the chained SHA-256 digest of a serialized record.
pub fn chain_digest(prev: &str, record_json: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(prev.as_bytes());
    hasher.update(b"\n");
    hasher.update(record_json.as_bytes());
    hex::encode(hasher.finalize())
}

/// Append handle on a journal file.
#[derive(Debug)]
pub struct Journal {
    path: PathBuf,
    file: File,
    last_digest: String,
}

impl Journal {
    /// Open (or create) the journal at `path` and replay its records.
    ///
    /// # Returns
    /// * `Ok((Journal, records))` - records in append order
    /// * `Err(LedgerError::Corrupt)` - if any line breaks the chain
    /// * `Err(LedgerError::Storage)` - if the file cannot be read or opened
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<(Self, Vec<TransactionRecord>)> {
        let path = path.as_ref().to_path_buf();
        let display = path.display().to_string();

        let mut records = Vec::new();
        let mut last_digest = GENESIS_DIGEST.to_string();

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                LedgerError::storage(format!("Failed to read journal: {}", e), &display)
            })?;

            for (idx, raw) in content.lines().enumerate() {
                let line_no = idx + 1;
                if raw.trim().is_empty() {
                    continue;
                }

                let line: JournalLine = serde_json::from_str(raw).map_err(|e| {
                    LedgerError::corrupt(format!("Unparsable line: {}", e), &display, line_no)
                })?;

                if line.prev != last_digest {
                    return Err(LedgerError::corrupt(
                        "Digest chain broken",
                        &display,
                        line_no,
                    ));
                }

                let record_json = serde_json::to_string(&line.record).map_err(|e| {
                    LedgerError::corrupt(format!("Unserializable record: {}", e), &display, line_no)
                })?;
                if chain_digest(&line.prev, &record_json) != line.digest {
                    return Err(LedgerError::corrupt(
                        "Record digest mismatch",
                        &display,
                        line_no,
                    ));
                }

                let expected_id = TransactionId::new(records.len() as u64);
                if line.record.id != expected_id {
                    return Err(LedgerError::corrupt(
                        format!(
                            "Record id {} out of sequence (expected {})",
                            line.record.id, expected_id
                        ),
                        &display,
                        line_no,
                    ));
                }

                last_digest = line.digest;
                records.push(line.record);
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| LedgerError::storage(format!("Failed to open journal: {}", e), &display))?;

        Ok((
            Self {
                path,
                file,
                last_digest,
            },
            records,
        ))
    }

    /// Durably append one record.
    pub fn append(&mut self, record: &TransactionRecord) -> LedgerResult<()> {
        let display = self.path.display().to_string();
        let record_json = serde_json::to_string(record)
            .map_err(|e| LedgerError::storage(format!("Failed to encode record: {}", e), &display))?;
        let digest = chain_digest(&self.last_digest, &record_json);

        let line = JournalLine {
            prev: self.last_digest.clone(),
            digest: digest.clone(),
            record: record.clone(),
        };
        let encoded = serde_json::to_string(&line)
            .map_err(|e| LedgerError::storage(format!("Failed to encode line: {}", e), &display))?;

        writeln!(self.file, "{}", encoded)
            .and_then(|_| self.file.sync_data())
            .map_err(|e| LedgerError::storage(format!("Failed to write journal: {}", e), &display))?;

        self.last_digest = digest;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
