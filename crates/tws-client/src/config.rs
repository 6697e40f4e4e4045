//! Client configuration.
//!
//! Defaults work against a local paper-trading terminal. Override through a
//! TOML file or a few environment variables:
//!
//! - `TWS_HOST`                  (default: "127.0.0.1")
//! - `TWS_PORT`                  (default: "7497")
//! - `TWS_CLIENT_ID`             (default: "0")
//! - `TWS_CONNECT_OPTIONS`       (default: "")
//! - `TWS_OPTIONAL_CAPABILITIES` (default: "")
//! - `TWS_CONNECT_TIMEOUT_MS`    (default: "10000")
//! - `TWS_QUEUE_POLL_MS`         (default: "200")

use std::env;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub host: String,
    pub port: u16,
    pub client_id: i32,

    /// Appended to the version range in the handshake hello.
    pub connect_options: String,

    /// Sent with `startApi` when the terminal supports it.
    pub optional_capabilities: String,

    /// Bounds both the TCP connect and the handshake reply.
    pub connect_timeout_ms: u64,

    /// How long the run loop waits for a frame before an idle tick.
    pub queue_poll_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7497,
            client_id: 0,
            connect_options: String::new(),
            optional_capabilities: String::new(),
            connect_timeout_ms: 10_000,
            queue_poll_ms: 200,
        }
    }
}

impl ClientConfig {
    /// Construct a `ClientConfig` from environment variables, falling back
    /// to defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            host: env::var("TWS_HOST").unwrap_or(defaults.host),
            port: read_env_or_default("TWS_PORT", defaults.port)?,
            client_id: read_env_or_default("TWS_CLIENT_ID", defaults.client_id)?,
            connect_options: env::var("TWS_CONNECT_OPTIONS").unwrap_or(defaults.connect_options),
            optional_capabilities: env::var("TWS_OPTIONAL_CAPABILITIES")
                .unwrap_or(defaults.optional_capabilities),
            connect_timeout_ms: read_env_or_default(
                "TWS_CONNECT_TIMEOUT_MS",
                defaults.connect_timeout_ms,
            )?,
            queue_poll_ms: read_env_or_default("TWS_QUEUE_POLL_MS", defaults.queue_poll_ms)?,
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn queue_poll(&self) -> Duration {
        Duration::from_millis(self.queue_poll_ms.max(1))
    }

    /// Convenience: `host:port` socket string.
    pub fn socket_addr_string(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn read_env_or_default<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(val) => val.trim().parse::<T>().map_err(|_| ConfigError::InvalidEnv {
            key: key.to_string(),
            value: val,
        }),
        Err(_) => Ok(default),
    }
}
