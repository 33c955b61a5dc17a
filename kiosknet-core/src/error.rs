//! Error types for the kiosknet device controller
//!
//! Library-level failures (configuration, settings store, probe construction)
//! are expressed through these enums. Orchestration failures are *data*: every
//! network operation returns a `CommandResult` and never propagates an `Err`
//! across the orchestrator boundary.

use thiserror::Error;

/// Main error type for the kiosknet application
#[derive(Error, Debug)]
pub enum KioskError {
    /// Errors related to configuration loading/parsing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Errors related to the key-value settings store
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// Errors constructing the server reachability probe
    #[error("Probe error: {0}")]
    Probe(#[from] ProbeError),

    /// Generic I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization errors
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration file: {path}")]
    LoadFailed { path: String },

    #[error("Missing required configuration field: {field}")]
    MissingField { field: String },

    #[error("Configuration validation error: {message}")]
    ValidationError { message: String },

    #[error("I/O error: {message}")]
    IoError { message: String },
}

/// Settings store operation errors
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to load settings file: {path}")]
    LoadFailed { path: String },

    #[error("Failed to save settings file: {path}")]
    SaveFailed { path: String },

    #[error("Settings file is not a flat key-value table")]
    InvalidShape,
}

/// Reachability probe construction errors
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("Invalid probe endpoint URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP client creation failed: {0}")]
    ClientCreationFailed(#[from] reqwest::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, KioskError>;
