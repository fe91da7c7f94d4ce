//! HTTP binding for the agent.
//!
//! A thin axum layer over the entrypoint registry. All validation, payment
//! and ledger logic stays in the library; handlers only translate between
//! HTTP and [`CallRequest`](crate::api::CallRequest).
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  HTTP Layer (axum handlers)                              │
//! │  - Body parsing, status mapping                          │
//! │  - CORS, compression, request tracing                    │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │ CallRequest
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Entrypoint Registry                                     │
//! │  - validate → charge → handler                           │
//! └───────────────────┬──────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼──────────────────────────────────────┐
//! │  Upstream Fetcher / Ledger / Analytics services          │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod dto;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::create_router;
pub use state::AppState;
