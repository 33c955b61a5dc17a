//! Configuration module
//!
//! Handles loading and validating the orchestrator configuration from TOML
//! files, plus the key-value settings store used by the UI/BLE front-ends.

use crate::error::{ConfigError, KioskError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod store;

pub use store::Settings;

/// A bounded polling loop: at most `max_attempts` iterations spaced
/// `interval_ms` apart
///
/// Poll loops carry their bounds as data so callers (and tests) can inject
/// tighter deadlines instead of relying on hard-coded iteration counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollPolicy {
    /// Maximum number of polling iterations before giving up
    pub max_attempts: u32,

    /// Delay between iterations in milliseconds
    pub interval_ms: u64,
}

impl PollPolicy {
    /// Create a new polling policy
    pub fn new(max_attempts: u32, interval_ms: u64) -> Self {
        Self {
            max_attempts,
            interval_ms,
        }
    }

    /// Delay between iterations as a [`Duration`]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Upper bound on total wall-clock time the loop may consume
    pub fn ceiling(&self) -> Duration {
        Duration::from_millis(self.interval_ms * self.max_attempts as u64)
    }
}

/// Orchestrator configuration structure
///
/// Contains the probe host and the timing bounds for every polling loop.
/// Sensitive data (Wi-Fi passwords) never passes through configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetConfig {
    /// Hostname probed to verify the connection actually reaches the server
    #[serde(default = "default_host")]
    pub host: String,

    /// Polling policy while waiting for a connection profile to activate
    #[serde(default = "default_activation_policy")]
    pub activation: PollPolicy,

    /// Retry policy for the server reachability probe
    #[serde(default = "default_server_probe_policy")]
    pub server_probe: PollPolicy,

    /// Per-request timeout for a single reachability probe, in seconds
    #[serde(default = "default_probe_timeout")]
    pub probe_timeout_secs: u64,

    /// Interval between ethernet watch polls, in seconds
    #[serde(default = "default_ethernet_watch_interval")]
    pub ethernet_watch_interval_secs: u64,
}

fn default_host() -> String {
    "device.example.com".to_string()
}
fn default_activation_policy() -> PollPolicy {
    // ~37.5s ceiling
    PollPolicy::new(75, 500)
}
fn default_server_probe_policy() -> PollPolicy {
    // ~10s ceiling
    PollPolicy::new(20, 500)
}
fn default_probe_timeout() -> u64 {
    5
}
fn default_ethernet_watch_interval() -> u64 {
    2
}

impl Default for NetConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            activation: default_activation_policy(),
            server_probe: default_server_probe_policy(),
            probe_timeout_secs: default_probe_timeout(),
            ethernet_watch_interval_secs: default_ethernet_watch_interval(),
        }
    }
}

impl NetConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.host.is_empty() {
            return Err("Probe host cannot be empty".to_string());
        }

        // Basic hostname validation
        if !self
            .host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-')
        {
            return Err("Probe host contains invalid characters".to_string());
        }

        for (name, policy) in [
            ("activation", &self.activation),
            ("server_probe", &self.server_probe),
        ] {
            if policy.max_attempts == 0 {
                return Err(format!("{} policy must allow at least one attempt", name));
            }
            if policy.interval_ms == 0 {
                return Err(format!("{} policy interval cannot be zero", name));
            }
        }

        if self.probe_timeout_secs == 0 {
            return Err("Probe timeout cannot be zero".to_string());
        }

        if self.ethernet_watch_interval_secs == 0 {
            return Err("Ethernet watch interval cannot be zero".to_string());
        }

        Ok(())
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, KioskError> {
        let contents = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => KioskError::Config(ConfigError::LoadFailed {
                path: path.to_string_lossy().to_string(),
            }),
            _ => KioskError::Config(ConfigError::IoError {
                message: format!("Failed to read config file: {}", e),
            }),
        })?;

        let config: NetConfig = toml::from_str(&contents).map_err(|e| {
            KioskError::Config(ConfigError::ValidationError {
                message: format!("Failed to parse config file: {}", e),
            })
        })?;

        config
            .validate()
            .map_err(|e| KioskError::Config(ConfigError::ValidationError { message: e }))?;

        Ok(config)
    }

    /// Ethernet watch interval as a [`Duration`]
    pub fn ethernet_watch_interval(&self) -> Duration {
        Duration::from_secs(self.ethernet_watch_interval_secs)
    }

    /// Single-probe timeout as a [`Duration`]
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }
}
