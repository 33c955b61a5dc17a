//! Core library for the kiosknet device controller
//!
//! This crate provides the network orchestration core for a kiosk-mode
//! single-board device: Wi-Fi association with activation polling and
//! rollback, server reachability probing, bulk profile reset, DNS override,
//! and an ethernet watcher. UI and BLE front-ends drive it through
//! [`net::NetworkOrchestrator`] and consume [`net::StatusEvent`]s.

pub mod config;
pub mod error;
pub mod net;

/// Initialize logging infrastructure
///
/// Sets up tracing with systemd journal logging for production use.
/// In development, logs to stderr with appropriate formatting.
pub fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    // Try to use systemd journal logging if available
    #[cfg(target_os = "linux")]
    {
        if std::env::var("JOURNAL_STREAM").is_ok() {
            // We're running under systemd, use journal logging
            let journal_layer = tracing_journald::layer()?;
            tracing_subscriber::registry()
                .with(journal_layer)
                .with(tracing_subscriber::filter::LevelFilter::INFO)
                .init();
            return Ok(());
        }
    }

    // Fallback to stderr logging with pretty formatting
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().pretty())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    Ok(())
}
