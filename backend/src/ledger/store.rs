//! In-memory transaction arena with optional journal persistence.
//!
//! Records live in a growable vector indexed by insertion position. The
//! vector is only ever pushed to, and every aggregate is recomputed from it.

use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::{Mutex, RwLock};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info};

use super::error::{LedgerError, LedgerResult};
use super::journal::Journal;
use super::record::{NewTransaction, TransactionId, TransactionRecord};

/// Append-only transaction ledger.
///
/// Cloning is cheap and every clone shares the same log.
#[derive(Clone, Default)]
pub struct Ledger {
    inner: Arc<LedgerInner>,
}

#[derive(Default)]
struct LedgerInner {
    records: RwLock<Vec<Arc<TransactionRecord>>>,
    journal: Option<Mutex<Journal>>,
}

impl Ledger {
    /// Create an empty, memory-only ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a ledger backed by the journal at `path`, replaying existing records.
    pub fn open<P: AsRef<Path>>(path: P) -> LedgerResult<Self> {
        let (journal, records) = Journal::open(path)?;
        info!(
            path = %journal.path().display(),
            records = records.len(),
            "Ledger journal replayed"
        );

        Ok(Self {
            inner: Arc::new(LedgerInner {
                records: RwLock::new(records.into_iter().map(Arc::new).collect()),
                journal: Some(Mutex::new(journal)),
            }),
        })
    }

    /// Whether appends are written to a journal.
    pub fn is_persistent(&self) -> bool {
        self.inner.journal.is_some()
    }

    /// Append a transaction and return its id.
    ///
    /// Writers serialize on the journal mutex, so journal order always
    /// equals log order. The records lock is only taken for the push;
    /// readers never wait on the journal sync.
    pub fn record(&self, entry: NewTransaction) -> LedgerResult<TransactionId> {
        let record = match &self.inner.journal {
            Some(journal) => {
                let mut journal = journal.lock();
                let id = TransactionId::new(self.inner.records.read().len() as u64);
                let record = Arc::new(TransactionRecord::from_new(id, entry));
                journal.append(&record)?;
                self.inner.records.write().push(Arc::clone(&record));
                record
            }
            None => {
                let mut records = self.inner.records.write();
                let id = TransactionId::new(records.len() as u64);
                let record = Arc::new(TransactionRecord::from_new(id, entry));
                records.push(Arc::clone(&record));
                record
            }
        };

        debug!(
            id = %record.id,
            direction = %record.direction,
            amount = %record.amount,
            entrypoint = %record.entrypoint,
            "Transaction recorded"
        );
        Ok(record.id)
    }

    /// Append from async code.
    ///
    /// Journal-backed ledgers write and sync on the blocking pool so a
    /// runtime worker is never parked on disk I/O.
    pub async fn append(&self, entry: NewTransaction) -> LedgerResult<TransactionId> {
        if !self.is_persistent() {
            return self.record(entry);
        }

        let ledger = self.clone();
        tokio::task::spawn_blocking(move || ledger.record(entry))
            .await
            .map_err(|e| {
                LedgerError::storage(format!("Journal task failed: {}", e), self.journal_path())
            })?
    }

    fn journal_path(&self) -> String {
        self.inner
            .journal
            .as_ref()
            .map(|journal| journal.lock().path().display().to_string())
            .unwrap_or_default()
    }

    /// Append a transaction, aborting the process if storage fails.
    pub async fn append_or_abort(&self, entry: NewTransaction) -> TransactionId {
        match self.append(entry).await {
            Ok(id) => id,
            Err(e) => {
                error!(error = %e, "Ledger storage failed; aborting");
                std::process::abort();
            }
        }
    }

    /// Fetch a record by id.
    pub fn get(&self, id: TransactionId) -> Option<Arc<TransactionRecord>> {
        usize::try_from(id.value())
            .ok()
            .and_then(|idx| self.inner.records.read().get(idx).cloned())
    }

    pub fn len(&self) -> usize {
        self.inner.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Records from the trailing `window_ms` milliseconds up to now, or the
    /// whole log when no window is given.
    pub fn all_since(&self, window_ms: Option<u64>) -> WindowedRecords {
        self.all_since_at(window_ms, Utc::now())
    }

    /// Same as [`Ledger::all_since`] with an explicit reference instant.
    pub fn all_since_at(&self, window_ms: Option<u64>, now: DateTime<Utc>) -> WindowedRecords {
        let snapshot = self.inner.records.read().clone();
        let bounds = window_ms.map(|ms| (window_start(now, ms), now));
        WindowedRecords {
            snapshot,
            bounds,
            window_ms,
        }
    }
}

fn window_start(now: DateTime<Utc>, window_ms: u64) -> DateTime<Utc> {
    i64::try_from(window_ms)
        .ok()
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| now.checked_sub_signed(delta))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// A restartable view over a ledger snapshot.
///
/// Filtering happens lazily on every [`WindowedRecords::iter`] call; records
/// appended after the snapshot was taken are not visible.
#[derive(Debug, Clone)]
pub struct WindowedRecords {
    snapshot: Vec<Arc<TransactionRecord>>,
    bounds: Option<(DateTime<Utc>, DateTime<Utc>)>,
    window_ms: Option<u64>,
}

impl WindowedRecords {
    /// Iterate matching records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &TransactionRecord> + '_ {
        self.snapshot
            .iter()
            .map(|record| record.as_ref())
            .filter(move |record| self.contains(record))
    }

    /// Inclusive on both ends.
    pub fn contains(&self, record: &TransactionRecord) -> bool {
        match self.bounds {
            Some((start, end)) => record.timestamp >= start && record.timestamp <= end,
            None => true,
        }
    }

    pub fn window_ms(&self) -> Option<u64> {
        self.window_ms
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}
