//! Configuration for kvadm components

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Global configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Agency connection
    #[serde(default)]
    pub agency: AgencyConfig,

    /// Admin HTTP API
    #[serde(default)]
    pub admin: AdminConfig,

    /// Removal retry policy
    #[serde(default)]
    pub removal: RemovalConfig,

    /// Logging level
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            agency: AgencyConfig::default(),
            admin: AdminConfig::default(),
            removal: RemovalConfig::default(),
            log_level: default_log_level(),
        }
    }
}

impl Config {
    /// Load configuration from `kvadm.toml` (if present) with `KVADM_*`
    /// environment overrides. Falls back to defaults on any load error.
    pub fn load() -> Self {
        let loaded = config::Config::builder()
            .add_source(config::File::with_name("kvadm").required(false))
            .add_source(config::Environment::with_prefix("KVADM").separator("__"))
            .build()
            .and_then(|c| c.try_deserialize());

        match loaded {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("Could not load config file, using defaults: {}", e);
                Config::default()
            }
        }
    }
}

/// Agency connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgencyConfig {
    /// Agency endpoints, tried in order
    #[serde(default = "default_agency_endpoints")]
    pub endpoints: Vec<String>,

    /// Root prefix of the configuration tree
    #[serde(default = "default_agency_prefix")]
    pub prefix: String,

    /// Per-request timeout
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_agency_endpoints() -> Vec<String> {
    vec!["http://localhost:8531".to_string()]
}
fn default_agency_prefix() -> String {
    "arango".to_string()
}
fn default_request_timeout() -> u64 {
    10_000
}

impl Default for AgencyConfig {
    fn default() -> Self {
        Self {
            endpoints: default_agency_endpoints(),
            prefix: default_agency_prefix(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl AgencyConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Admin HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Bind address for the admin HTTP API
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,
}

fn default_bind_addr() -> SocketAddr {
    "0.0.0.0:7100".parse().expect("static default address")
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
        }
    }
}

/// Removal retry policy configuration
///
/// The defaults match the documented contract: up to 60 attempts at a
/// fixed 1-second interval, so a blocked removal fails after ~60s with
/// a diagnostic report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemovalConfig {
    /// Maximum removal attempts before giving up
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (no backoff)
    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,
}

fn default_max_attempts() -> u32 {
    60
}
fn default_retry_delay() -> u64 {
    1_000
}

impl Default for RemovalConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
        }
    }
}

impl RemovalConfig {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert_eq!(cfg.agency.prefix, "arango");
        assert_eq!(cfg.removal.max_attempts, 60);
        assert_eq!(cfg.removal.retry_delay(), Duration::from_secs(1));
        assert_eq!(cfg.log_level, "info");
    }

    #[test]
    fn test_partial_deserialization() {
        let cfg: Config = serde_json::from_str(r#"{"removal": {"max_attempts": 5}}"#).unwrap();
        assert_eq!(cfg.removal.max_attempts, 5);
        assert_eq!(cfg.removal.retry_delay_ms, 1_000);
        assert_eq!(cfg.agency.endpoints, vec!["http://localhost:8531"]);
    }
}
