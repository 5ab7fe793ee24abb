//! # SMS Forwarder Configuration
//!
//! Layered settings for the forwarder service: the delivery endpoint and its
//! timeouts, the background runner bounds, log output and lifecycle policy.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use forwarder_config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Some(Path::new("config/forwarder.toml")))?;
//! println!("forwarding to {}", config.delivery.endpoint_url);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod forwarder_config;

// Re-export commonly used types
pub use forwarder_config::{
    load_config, DeliveryConfig, ForwarderConfig, LogFormat, LoggingConfig, RestartPolicy,
    RunnerConfig, ServiceSettings, ENV_PREFIX,
};
