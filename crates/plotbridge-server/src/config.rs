//! Server configuration
//!
//! Settings for the HTTP listener and the device connection, with
//! environment-variable overrides. `PORT` keeps its conventional
//! meaning; device settings use `PLOTBRIDGE_`-prefixed variables.

use plotbridge_communication::DeviceConfig;
use plotbridge_core::constants::DEFAULT_HTTP_PORT;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Top-level configuration for the bridge process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port the HTTP server listens on
    pub http_port: u16,
    /// Connection parameters for the plotter
    pub device: DeviceConfig,
    /// Upper bound on how long a request may wait for its command
    /// queue to finish, in milliseconds
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            device: DeviceConfig::default(),
            request_timeout_ms: 60_000,
        }
    }
}

impl ServerConfig {
    /// Build a configuration from the environment, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(port) = env_parse::<u16>("PORT") {
            config.http_port = port;
        }
        if let Ok(host) = std::env::var("PLOTBRIDGE_DEVICE_HOST") {
            if !host.is_empty() {
                config.device.host = host;
            }
        }
        if let Some(port) = env_parse::<u16>("PLOTBRIDGE_DEVICE_PORT") {
            config.device.port = port;
        }
        if let Some(ms) = env_parse::<u64>("PLOTBRIDGE_REQUEST_TIMEOUT_MS") {
            config.request_timeout_ms = ms;
        }
        config
    }

    /// The request completion bound as a `Duration`.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use plotbridge_core::constants::{DEFAULT_DEVICE_HOST, DEFAULT_DEVICE_PORT};

    #[test]
    fn defaults_match_the_device_documentation() {
        let config = ServerConfig::default();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.device.host, DEFAULT_DEVICE_HOST);
        assert_eq!(config.device.port, DEFAULT_DEVICE_PORT);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
    }

    #[test]
    fn config_round_trips_through_json() {
        let config = ServerConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let back: ServerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back.http_port, config.http_port);
        assert_eq!(back.device.host, config.device.host);
    }
}
