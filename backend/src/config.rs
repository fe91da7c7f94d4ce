//! Agent configuration file support.
//!
//! Configuration is read from an `agent.toml` file (every section optional)
//! and then overridden from environment variables.
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8080
//!
//! [upstream]
//! base_url = "https://api.spacexdata.com/v4"
//! timeout_secs = 10
//! cost_per_request = "0"
//!
//! [payments]
//! mode = "proof"   # or "open"
//!
//! [ledger]
//! journal_path = "ledger.jsonl"
//!
//! [pricing]
//! "upcoming-launches" = "0.002"
//! "company-info" = "0"
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("Failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub payments: PaymentsConfig,
    #[serde(default)]
    pub ledger: LedgerConfig,
    /// Per-entrypoint price overrides (decimal strings, `"0"` = free).
    #[serde(default)]
    pub pricing: BTreeMap<String, String>,
}

/// HTTP bind settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Upstream data API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Expense recorded per upstream request (decimal string).
    #[serde(default = "default_cost_per_request")]
    pub cost_per_request: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            cost_per_request: default_cost_per_request(),
        }
    }
}

/// How paid calls are settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMode {
    /// Every charge settles (local development only).
    Open,
    /// A payment proof covering the price is required.
    #[default]
    Proof,
}

impl FromStr for PaymentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "proof" => Ok(Self::Proof),
            other => Err(format!(
                "Invalid payment mode '{}'. Valid options: open, proof",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentsConfig {
    #[serde(default)]
    pub mode: PaymentMode,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Journal file; memory-only ledger when absent.
    #[serde(default)]
    pub journal_path: Option<PathBuf>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_base_url() -> String {
    "https://api.spacexdata.com/v4".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_cost_per_request() -> String {
    "0".to_string()
}

impl AgentConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let display = path.as_ref().display().to_string();
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Read {
            path: display.clone(),
            message: e.to_string(),
        })?;

        Self::from_toml_str(&content).map_err(|e| match e {
            ConfigError::Parse { message, .. } => ConfigError::Parse {
                path: display,
                message,
            },
            other => other,
        })
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: "<inline>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the default location, falling back to defaults.
    ///
    /// Searches for `agent.toml` in:
    /// 1. Current directory
    /// 2. `backend/` directory
    /// 3. Parent directory
    pub fn from_default_location() -> Result<Self, ConfigError> {
        let search_paths = [
            PathBuf::from("agent.toml"),
            PathBuf::from("backend/agent.toml"),
            PathBuf::from("../agent.toml"),
        ];

        for path in search_paths {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    /// Apply environment variable overrides.
    ///
    /// # Environment Variables
    /// - `HOST`: Server host
    /// - `PORT`: Server port
    /// - `SPACEX_API_URL`: Upstream base URL
    /// - `PAYMENTS_MODE`: `open` | `proof`
    /// - `LEDGER_JOURNAL`: Journal file path
    pub fn apply_env(mut self) -> Result<Self, ConfigError> {
        if let Ok(host) = env::var("HOST") {
            self.server.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| ConfigError::Invalid("PORT must be a valid port number".to_string()))?;
        }
        if let Ok(url) = env::var("SPACEX_API_URL") {
            self.upstream.base_url = url;
        }
        if let Ok(mode) = env::var("PAYMENTS_MODE") {
            self.payments.mode = mode.parse().map_err(ConfigError::Invalid)?;
        }
        if let Ok(path) = env::var("LEDGER_JOURNAL") {
            self.ledger.journal_path = Some(PathBuf::from(path));
        }

        self.validate()?;
        Ok(self)
    }

    /// Check decimal fields and numeric bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.upstream.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "upstream.timeout_secs must be greater than zero".to_string(),
            ));
        }
        self.upstream_cost()?;
        for key in self.pricing.keys() {
            self.price_override(key)?;
        }
        Ok(())
    }

    /// Expense per upstream request, `None` when zero.
    pub fn upstream_cost(&self) -> Result<Option<Decimal>, ConfigError> {
        let cost = parse_amount("upstream.cost_per_request", &self.upstream.cost_per_request)?;
        Ok((!cost.is_zero()).then_some(cost))
    }

    /// Price override for `key`.
    ///
    /// # Returns
    /// * `Ok(None)` - no override configured
    /// * `Ok(Some(None))` - overridden to free
    /// * `Ok(Some(Some(price)))` - overridden price
    pub fn price_override(&self, key: &str) -> Result<Option<Option<Decimal>>, ConfigError> {
        match self.pricing.get(key) {
            None => Ok(None),
            Some(raw) => {
                let price = parse_amount(&format!("pricing.{}", key), raw)?;
                Ok(Some((!price.is_zero()).then_some(price)))
            }
        }
    }
}

fn parse_amount(field: &str, raw: &str) -> Result<Decimal, ConfigError> {
    let amount = Decimal::from_str(raw.trim())
        .map_err(|e| ConfigError::Invalid(format!("{} is not a decimal amount: {}", field, e)))?;
    if amount.is_sign_negative() {
        return Err(ConfigError::Invalid(format!("{} must not be negative", field)));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.upstream.base_url, "https://api.spacexdata.com/v4");
        assert_eq!(config.upstream.timeout_secs, 10);
        assert_eq!(config.payments.mode, PaymentMode::Proof);
        assert!(config.ledger.journal_path.is_none());
        assert_eq!(config.upstream_cost().unwrap(), None);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[upstream]
base_url = "http://localhost:4000/v4"
timeout_secs = 3
cost_per_request = "0.0001"

[payments]
mode = "open"

[ledger]
journal_path = "/tmp/ledger.jsonl"

[pricing]
"upcoming-launches" = "0.005"
"company-info" = "0"
"#;

        let config = AgentConfig::from_toml_str(toml).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upstream.timeout_secs, 3);
        assert_eq!(config.payments.mode, PaymentMode::Open);
        assert_eq!(
            config.ledger.journal_path,
            Some(PathBuf::from("/tmp/ledger.jsonl"))
        );
        assert_eq!(
            config.upstream_cost().unwrap(),
            Some(Decimal::from_str("0.0001").unwrap())
        );
        assert_eq!(
            config.price_override("upcoming-launches").unwrap(),
            Some(Some(Decimal::from_str("0.005").unwrap()))
        );
        assert_eq!(config.price_override("company-info").unwrap(), Some(None));
        assert_eq!(config.price_override("rockets").unwrap(), None);
    }

    #[test]
    fn test_rejects_bad_price() {
        let toml = r#"
[pricing]
"rockets" = "cheap"
"#;
        assert!(matches!(
            AgentConfig::from_toml_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_rejects_negative_cost_and_zero_timeout() {
        assert!(AgentConfig::from_toml_str("[upstream]\ncost_per_request = \"-1\"").is_err());
        assert!(AgentConfig::from_toml_str("[upstream]\ntimeout_secs = 0").is_err());
    }

    #[test]
    fn test_payment_mode_from_str() {
        assert_eq!("OPEN".parse::<PaymentMode>().unwrap(), PaymentMode::Open);
        assert_eq!("proof".parse::<PaymentMode>().unwrap(), PaymentMode::Proof);
        assert!("free-for-all".parse::<PaymentMode>().is_err());
    }
}
