//! Entrypoint catalogue.
//!
//! ```text
//! ┌────────────┬─────────────────────────────────────────────┐
//! │ launches   │ latest-launch, next-launch,                 │
//! │            │ upcoming-launches, past-launches            │
//! │ fleet      │ rockets, launchpads, starlink-stats         │
//! │ company    │ company-info, roadster                      │
//! │ report     │ full-report                                 │
//! │ analytics  │ analytics-summary, analytics-transactions,  │
//! │            │ analytics-export-csv                        │
//! └────────────┴─────────────────────────────────────────────┘
//! ```
//!
//! Each module owns its keys, contracts and default prices. Prices can be
//! overridden per key from the `[pricing]` config section.

pub mod analytics;
pub mod company;
pub mod fleet;
pub mod launches;
pub mod model;
pub mod report;

use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::config::{AgentConfig, ConfigError};
use crate::ledger::Ledger;
use crate::payments::PaymentGateway;
use crate::registry::{
    EntrypointDefinition, EntrypointRegistry, HandlerError, HandlerResult, RegistryError,
};
use crate::upstream::UpstreamFetcher;

/// Upstream resource paths, relative to the API base URL.
pub mod paths {
    pub const LAUNCHES_LATEST: &str = "/launches/latest";
    pub const LAUNCHES_NEXT: &str = "/launches/next";
    pub const LAUNCHES_UPCOMING: &str = "/launches/upcoming";
    pub const LAUNCHES_PAST: &str = "/launches/past";
    pub const ROCKETS: &str = "/rockets";
    pub const LAUNCHPADS: &str = "/launchpads";
    pub const STARLINK: &str = "/starlink";
    pub const COMPANY: &str = "/company";
    pub const ROADSTER: &str = "/roadster";
}

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error("Pricing configured for unknown entrypoint '{0}'")]
    UnknownPricingKey(String),
}

/// Every entrypoint with its default price, in manifest order.
pub fn catalogue() -> Vec<EntrypointDefinition> {
    let mut definitions = launches::definitions();
    definitions.extend(fleet::definitions());
    definitions.extend(company::definitions());
    definitions.extend(report::definitions());
    definitions.extend(analytics::definitions());
    definitions
}

/// Build the registry for `config`, applying price overrides and the
/// metered upstream cost.
///
/// # Errors
/// Fails when `[pricing]` names an unknown key or holds an invalid amount.
pub fn build_registry(
    config: &AgentConfig,
    upstream: Arc<dyn UpstreamFetcher>,
    gateway: Arc<dyn PaymentGateway>,
    ledger: Ledger,
) -> Result<EntrypointRegistry, CatalogueError> {
    let definitions = catalogue();

    if let Some(unknown) = config
        .pricing
        .keys()
        .find(|key| !definitions.iter().any(|d| &d.key == *key))
    {
        return Err(CatalogueError::UnknownPricingKey(unknown.clone()));
    }

    let mut registry = EntrypointRegistry::new(upstream, gateway, ledger)
        .with_upstream_cost(config.upstream_cost()?);

    for mut definition in definitions {
        if let Some(price) = config.price_override(&definition.key)? {
            definition.price = price;
        }
        registry.register(definition)?;
    }

    info!(
        entrypoints = registry.definitions().len(),
        paid = registry
            .definitions()
            .iter()
            .filter(|d| d.price.is_some())
            .count(),
        "Entrypoint catalogue registered"
    );
    Ok(registry)
}

/// Serialize a shaped handler result.
pub(crate) fn to_output<T: Serialize>(value: &T) -> HandlerResult {
    serde_json::to_value(value)
        .map_err(|e| HandlerError::failed(format!("Failed to encode output: {}", e)))
}
