//! # SpaceX Agent
//!
//! Paid data agent proxying the public SpaceX REST API (v4).
//!
//! Every data entrypoint is a thin transform: fetch upstream JSON, filter and
//! map fields, return a shaped object. Around them sits the part with actual
//! invariants: payment-gated dispatch and the transaction ledger it feeds.
//!
//! ## Features
//!
//! - **Input contracts**: declared per entrypoint, validated before anything runs
//! - **Price per call**: settled through a [`payments::PaymentGateway`] before the handler
//! - **Ledger**: append-only, exact-decimal transaction log with optional journal
//! - **Analytics**: windowed summaries, listings and CSV export over the ledger
//! - **HTTP API**: axum binding with a discovery manifest
//!
//! ## Architecture
//!
//! - [`api`]: Call boundary types (`CallRequest` / `CallResponse`)
//! - [`registry`]: Entrypoint registry, input contracts and dispatch errors
//! - [`entrypoints`]: The SpaceX entrypoint catalogue
//! - [`upstream`]: Upstream JSON fetching (HTTP and canned)
//! - [`payments`]: Payment gateway boundary
//! - [`ledger`]: Transaction ledger and journal
//! - [`services`]: Analytics over the ledger
//! - [`config`]: `agent.toml` and environment configuration
//! - [`http`]: Axum-based HTTP server

pub mod api;
pub mod config;
pub mod entrypoints;
pub mod ledger;
pub mod payments;
pub mod registry;
pub mod services;
pub mod upstream;

#[cfg(feature = "http-server")]
pub mod http;
