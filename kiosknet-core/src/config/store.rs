//! Key-value settings store
//!
//! TOML-backed string key-value storage shared with the UI/BLE front-ends.
//! The orchestrator reads `host` (server hostname for reachability probes)
//! and reads/writes `dns`.

use crate::error::{KioskError, SettingsError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Settings key for the reachability probe host
pub const KEY_HOST: &str = "host";

/// Settings key for the statically configured DNS server
pub const KEY_DNS: &str = "dns";

/// Default settings file name
const SETTINGS_FILE_NAME: &str = "settings.toml";

/// Flat string key-value store persisted as a TOML table
///
/// Every `set` writes through to disk so a crash never loses a value the
/// caller was already told is stored.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl Settings {
    /// Open the settings store at `path`, creating an empty one if the file
    /// does not exist yet
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KioskError> {
        let path = path.as_ref().to_path_buf();

        let values = match std::fs::read_to_string(&path) {
            Ok(contents) => {
                let table: toml::Table = toml::from_str(&contents).map_err(|_| {
                    KioskError::Settings(SettingsError::LoadFailed {
                        path: path.to_string_lossy().to_string(),
                    })
                })?;

                let mut values = BTreeMap::new();
                for (key, value) in table {
                    match value {
                        toml::Value::String(s) => {
                            values.insert(key, s);
                        }
                        _ => return Err(KioskError::Settings(SettingsError::InvalidShape)),
                    }
                }
                values
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(_) => {
                return Err(KioskError::Settings(SettingsError::LoadFailed {
                    path: path.to_string_lossy().to_string(),
                }))
            }
        };

        Ok(Self { path, values })
    }

    /// Open the settings store at the default location
    ///
    /// Honors the `KIOSKNET_CONFIG_DIR` environment variable so tests and
    /// provisioning scripts can redirect the store.
    pub fn open_default() -> Result<Self, KioskError> {
        Ok(Self::open(default_settings_path()?)?)
    }

    /// Get a value by key
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Get a value by key, falling back to `default` when absent
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Set a value and persist the store
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), KioskError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// Remove a value and persist the store
    ///
    /// Returns the previous value, if any.
    pub fn remove(&mut self, key: &str) -> Result<Option<String>, KioskError> {
        let previous = self.values.remove(key);
        if previous.is_some() {
            self.save()?;
        }
        Ok(previous)
    }

    fn save(&self) -> Result<(), KioskError> {
        let mut table = toml::Table::new();
        for (key, value) in &self.values {
            table.insert(key.clone(), toml::Value::String(value.clone()));
        }
        let contents = toml::to_string_pretty(&table)?;

        // Ensure parent directory exists
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| {
                KioskError::Settings(SettingsError::SaveFailed {
                    path: self.path.to_string_lossy().to_string(),
                })
            })?;
        }

        std::fs::write(&self.path, contents).map_err(|_| {
            KioskError::Settings(SettingsError::SaveFailed {
                path: self.path.to_string_lossy().to_string(),
            })
        })?;

        Ok(())
    }
}

/// Get the default settings file path
///
/// Returns `$KIOSKNET_CONFIG_DIR/settings.toml` when the variable is set,
/// otherwise `~/.config/kiosknet/settings.toml`.
pub fn default_settings_path() -> Result<PathBuf, KioskError> {
    if let Ok(config_dir) = std::env::var("KIOSKNET_CONFIG_DIR") {
        return Ok(PathBuf::from(config_dir).join(SETTINGS_FILE_NAME));
    }

    let home = std::env::var("HOME").map_err(|_| {
        KioskError::Config(crate::error::ConfigError::IoError {
            message: "HOME environment variable not set".to_string(),
        })
    })?;

    Ok(PathBuf::from(home)
        .join(".config")
        .join("kiosknet")
        .join(SETTINGS_FILE_NAME))
}
