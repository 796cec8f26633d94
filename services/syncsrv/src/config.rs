//! Service configuration
//!
//! Loaded from a YAML file merged with `SYNCSRV_`-prefixed environment
//! variables (nested keys separated by `__`, e.g. `SYNCSRV_ERP__TOKEN`).

use figment::{
    providers::{Env, Format, Serialized, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, SyncSrvError};

/// HTTP API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8086
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Configuration store location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

fn default_db_path() -> String {
    "data/syncsrv.db".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

/// Upstream ERP connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErpConfig {
    /// Base URL of the ERP REST surface, e.g. "https://acme.example.com"
    #[serde(default)]
    pub base_url: String,
    /// Account identifier on the ERP platform
    #[serde(default)]
    pub account: String,
    /// API token used as a bearer credential
    #[serde(default)]
    pub token: String,
    /// Maximum number of concurrent entity probes during a scan
    #[serde(default = "default_probe_concurrency")]
    pub probe_concurrency: usize,
    /// Per-probe timeout in seconds; a timed-out probe counts as a failure
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,
}

fn default_probe_concurrency() -> usize {
    8
}

fn default_probe_timeout_secs() -> u64 {
    10
}

impl Default for ErpConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            account: String::new(),
            token: String::new(),
            probe_concurrency: default_probe_concurrency(),
            probe_timeout_secs: default_probe_timeout_secs(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Complete service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSrvConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub erp: ErpConfig,
    #[serde(default)]
    pub log: LogConfig,
}

impl SyncSrvConfig {
    /// Load configuration from an optional YAML file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(SyncSrvConfig::default()));

        if let Some(path) = path {
            if !path.exists() {
                return Err(SyncSrvError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            figment = figment.merge(Yaml::file(path));
        }

        figment
            .merge(Env::prefixed("SYNCSRV_").split("__"))
            .extract()
            .map_err(|e| SyncSrvError::ConfigError(e.to_string()))
    }

    /// Validate the configuration, including the ERP credential precondition.
    ///
    /// Missing credentials are fatal before any scan work starts.
    pub fn validate(&self) -> Result<()> {
        if self.api.port == 0 {
            return Err(SyncSrvError::ConfigError(
                "api.port must be non-zero".to_string(),
            ));
        }
        if self.erp.base_url.trim().is_empty() {
            return Err(SyncSrvError::PreconditionMissing(
                "erp.base_url is not configured".to_string(),
            ));
        }
        if self.erp.account.trim().is_empty() {
            return Err(SyncSrvError::PreconditionMissing(
                "erp.account is not configured".to_string(),
            ));
        }
        if self.erp.token.trim().is_empty() {
            return Err(SyncSrvError::PreconditionMissing(
                "erp.token is not configured".to_string(),
            ));
        }
        if self.erp.probe_concurrency == 0 {
            return Err(SyncSrvError::ConfigError(
                "erp.probe_concurrency must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::disallowed_methods)] // Test code - unwrap is acceptable
mod tests {
    use super::*;
    use std::io::Write;

    fn configured() -> SyncSrvConfig {
        let mut config = SyncSrvConfig::default();
        config.erp.base_url = "https://acme.example.com".to_string();
        config.erp.account = "ACME".to_string();
        config.erp.token = "secret".to_string();
        config
    }

    #[test]
    fn test_defaults() {
        let config = SyncSrvConfig::default();
        assert_eq!(config.api.port, 8086);
        assert_eq!(config.erp.probe_concurrency, 8);
        assert_eq!(config.erp.probe_timeout_secs, 10);
    }

    #[test]
    fn test_missing_credentials_is_precondition_error() {
        let config = SyncSrvConfig::default();
        match config.validate() {
            Err(SyncSrvError::PreconditionMissing(_)) => {}
            other => panic!("expected PreconditionMissing, got {:?}", other.err()),
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(configured().validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = configured();
        config.erp.probe_concurrency = 0;
        assert!(matches!(
            config.validate(),
            Err(SyncSrvError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_from_yaml_file() {
        let mut file = tempfile::NamedTempFile::with_suffix(".yaml").unwrap();
        writeln!(
            file,
            "api:\n  port: 9001\nerp:\n  base_url: https://x.example.com\n  account: X\n  token: t"
        )
        .unwrap();

        let config = SyncSrvConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.api.port, 9001);
        assert_eq!(config.erp.account, "X");
        // Untouched settings keep their defaults
        assert_eq!(config.erp.probe_timeout_secs, 10);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = SyncSrvConfig::load(Some(Path::new("/nonexistent/syncsrv.yaml")));
        assert!(matches!(result, Err(SyncSrvError::ConfigError(_))));
    }
}
