//! Transaction ledger.
//!
//! The ledger is the only shared mutable state in the agent. It is an
//! append-only, insertion-ordered log of payment events written as a side
//! effect of paid dispatch (and of metered upstream cost, when enabled).
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │  Entrypoint Registry / HandlerContext       │
//! │  - append_or_abort(NewTransaction).await    │
//! └───────────────────┬─────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────┐
//! │  Ledger (store.rs)                          │
//! │  - Vec<Arc<TransactionRecord>> arena        │
//! │  - windowed snapshots for analytics         │
//! └───────────────────┬─────────────────────────┘
//!                     │ optional
//! ┌───────────────────▼─────────────────────────┐
//! │  Journal (journal.rs)                       │
//! │  - JSON lines + SHA-256 digest chain        │
//! └─────────────────────────────────────────────┘
//! ```

pub mod error;
pub mod journal;
pub mod record;
pub mod store;

pub use error::{LedgerError, LedgerResult};
pub use journal::{chain_digest, Journal};
pub use record::{Direction, Metadata, NewTransaction, TransactionId, TransactionRecord};
pub use store::{Ledger, WindowedRecords};
