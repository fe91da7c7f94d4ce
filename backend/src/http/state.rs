//! Application state for the HTTP server.

use std::sync::Arc;

use crate::ledger::Ledger;
use crate::registry::EntrypointRegistry;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry serving every entrypoint call
    pub registry: Arc<EntrypointRegistry>,
}

impl AppState {
    pub fn new(registry: EntrypointRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub fn ledger(&self) -> &Ledger {
        self.registry.ledger()
    }
}
