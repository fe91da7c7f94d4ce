//! Transaction records stored in the ledger.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Transaction identifier (insertion position in the ledger).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TransactionId(pub u64);

impl TransactionId {
    pub fn new(value: u64) -> Self {
        TransactionId(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which way money moved, seen from the agent.
///
/// `Incoming` is revenue the agent received from a caller; `Outgoing` is an
/// expense the agent paid itself (for example metered upstream cost).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Incoming,
    Outgoing,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Incoming => "incoming",
            Direction::Outgoing => "outgoing",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "incoming" => Ok(Direction::Incoming),
            "outgoing" => Ok(Direction::Outgoing),
            other => Err(format!("Unknown transaction direction '{}'", other)),
        }
    }
}

/// Free-form record metadata. Sorted keys keep exports deterministic.
pub type Metadata = BTreeMap<String, String>;

/// A transaction that has not been appended yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub direction: Direction,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub entrypoint: String,
    pub metadata: Metadata,
}

impl NewTransaction {
    /// Revenue received for a call to `entrypoint`, timestamped now.
    pub fn incoming(entrypoint: impl Into<String>, amount: Decimal) -> Self {
        Self::new(Direction::Incoming, entrypoint, amount)
    }

    /// Expense paid while serving `entrypoint`, timestamped now.
    pub fn outgoing(entrypoint: impl Into<String>, amount: Decimal) -> Self {
        Self::new(Direction::Outgoing, entrypoint, amount)
    }

    fn new(direction: Direction, entrypoint: impl Into<String>, amount: Decimal) -> Self {
        Self {
            direction,
            amount,
            timestamp: Utc::now(),
            entrypoint: entrypoint.into(),
            metadata: Metadata::new(),
        }
    }

    /// Override the timestamp.
    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Attach one metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// An appended, immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRecord {
    pub id: TransactionId,
    pub direction: Direction,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub entrypoint: String,
    #[serde(default)]
    pub metadata: Metadata,
}

impl TransactionRecord {
    pub(crate) fn from_new(id: TransactionId, entry: NewTransaction) -> Self {
        Self {
            id,
            direction: entry.direction,
            amount: entry.amount,
            timestamp: entry.timestamp,
            entrypoint: entry.entrypoint,
            metadata: entry.metadata,
        }
    }
}
