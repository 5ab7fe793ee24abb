//! Forwarder Configuration Module
//!
//! Loads the forwarder's settings in layers: built-in defaults, then an
//! optional TOML file, then `SMS_FORWARDER__*` environment variables.
//! Nested keys use a double underscore, e.g.
//! `SMS_FORWARDER__DELIVERY__ENDPOINT_URL`.

use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "SMS_FORWARDER";

/// Main forwarder configuration structure
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ForwarderConfig {
    /// Outbound delivery settings
    pub delivery: DeliveryConfig,

    /// Background runner settings
    pub runner: RunnerConfig,

    /// Log output settings
    pub logging: LoggingConfig,

    /// Lifecycle settings
    pub service: ServiceSettings,
}

/// Where and how records are delivered
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DeliveryConfig {
    /// Forwarding endpoint; `${VAR}` references are expanded at load time
    pub endpoint_url: String,
    pub connect_timeout_ms: u64,
    pub read_timeout_ms: u64,
}

impl DeliveryConfig {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            endpoint_url: "http://10.0.2.16:8080/sms".to_string(),
            connect_timeout_ms: 5_000,
            read_timeout_ms: 5_000,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RunnerConfig {
    /// Upper bound on concurrently running delivery tasks
    pub max_in_flight: usize,
    /// Tokio worker threads for the service binary
    pub worker_threads: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_in_flight: 16,
            worker_threads: 2,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// What the supervisor does when the host removes the service's task
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RestartPolicy {
    /// Start the service again
    #[default]
    Sticky,
    /// Leave it stopped
    Never,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ServiceSettings {
    pub restart_policy: RestartPolicy,
    /// Refuse to start until the host reports the SMS permissions as granted
    pub require_permissions: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            restart_policy: RestartPolicy::Sticky,
            require_permissions: true,
        }
    }
}

impl ForwarderConfig {
    /// Load configuration with environment overrides
    ///
    /// `path` is optional; without it only defaults and environment apply.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            info!("Loading forwarder config: {:?}", path);
            builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
        } else {
            debug!("No config file given, using defaults and environment");
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let mut config: ForwarderConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.expand_env_vars()?;
        config.validate()?;
        Ok(config)
    }

    /// Expand environment variables in string values
    pub fn expand_env_vars(&mut self) -> Result<()> {
        let expanded = shellexpand::env(&self.delivery.endpoint_url)
            .context("Failed to expand endpoint URL")?;
        self.delivery.endpoint_url = expanded.into_owned();
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.delivery.endpoint_url)
            .with_context(|| format!("Invalid endpoint URL {:?}", self.delivery.endpoint_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("Endpoint URL must be http or https, got {:?}", url.scheme());
        }
        if self.delivery.connect_timeout_ms == 0 {
            bail!("delivery.connect_timeout_ms must be greater than zero");
        }
        if self.delivery.read_timeout_ms == 0 {
            bail!("delivery.read_timeout_ms must be greater than zero");
        }
        if self.runner.max_in_flight == 0 {
            bail!("runner.max_in_flight must be greater than zero");
        }
        if self.runner.worker_threads == 0 {
            bail!("runner.worker_threads must be greater than zero");
        }
        Ok(())
    }
}

/// Convenience function to load configuration from an optional file
pub fn load_config(path: Option<&Path>) -> Result<ForwarderConfig> {
    ForwarderConfig::load(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = ForwarderConfig::default();
        assert_eq!(config.delivery.endpoint_url, "http://10.0.2.16:8080/sms");
        assert_eq!(config.delivery.connect_timeout(), Duration::from_secs(5));
        assert_eq!(config.delivery.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.runner.max_in_flight, 16);
        assert_eq!(config.service.restart_policy, RestartPolicy::Sticky);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_partial_file() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("forwarder.toml");

        let config_content = r#"
[delivery]
endpoint_url = "https://relay.example.com/inbound"
read_timeout_ms = 2500

[logging]
level = "debug"
format = "json"

[service]
restart_policy = "never"
"#;

        fs::write(&config_path, config_content).unwrap();

        let config = ForwarderConfig::load(Some(&config_path)).unwrap();

        assert_eq!(config.delivery.endpoint_url, "https://relay.example.com/inbound");
        assert_eq!(config.delivery.read_timeout_ms, 2500);
        assert_eq!(config.delivery.connect_timeout_ms, 5000);
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.service.restart_policy, RestartPolicy::Never);
        assert!(config.service.require_permissions);
        assert_eq!(config.runner, RunnerConfig::default());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(ForwarderConfig::load(Some(&dir.path().join("absent.toml"))).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut config = ForwarderConfig::default();
        config.delivery.endpoint_url = "not a url".to_string();
        assert!(config.validate().is_err());

        let mut config = ForwarderConfig::default();
        config.delivery.endpoint_url = "ftp://10.0.2.16/sms".to_string();
        assert!(config.validate().is_err());

        let mut config = ForwarderConfig::default();
        config.delivery.connect_timeout_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ForwarderConfig::default();
        config.runner.max_in_flight = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_value_fails_load() {
        let dir = tempdir().unwrap();
        let config_path = dir.path().join("forwarder.toml");
        fs::write(&config_path, "[runner]\nmax_in_flight = 0\n").unwrap();
        let err = ForwarderConfig::load(Some(&config_path)).unwrap_err();
        assert!(err.to_string().contains("max_in_flight"));
    }
}
