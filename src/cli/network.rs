//! Network command implementations
//!
//! Each command builds an orchestrator over the real shell runner and HTTP
//! probe, runs one operation, and renders the outcome. The boolean in the
//! return value is the operation's own success and becomes the exit code.

use colored::Colorize;
use kiosknet_core::config::store::KEY_HOST;
use kiosknet_core::config::{NetConfig, Settings};
use kiosknet_core::error::{ConfigError, KioskError};
use kiosknet_core::net::events::{self, EventReceiver};
use kiosknet_core::net::{
    CancelToken, ConnectRequest, EthernetWatcher, HttpProbe, LinkKind, NetworkOrchestrator,
    OutcomeTag, Psk, ShellRunner, StatusEvent,
};
use std::sync::Arc;
use tracing::info;

type Orchestrator = NetworkOrchestrator<ShellRunner, HttpProbe>;

/// Build the production orchestrator from the on-disk settings store
fn build_orchestrator() -> Result<(Arc<Orchestrator>, EventReceiver, NetConfig), KioskError> {
    ensure_nmcli()?;

    let settings = Settings::open_default()?;

    let mut config = NetConfig::default();
    if let Some(host) = settings.get(KEY_HOST) {
        config.host = host.to_string();
    }
    config
        .validate()
        .map_err(|message| KioskError::Config(ConfigError::ValidationError { message }))?;

    let probe = HttpProbe::new(
        HttpProbe::endpoint_for_host(&config.host),
        config.probe_timeout(),
    )?;

    let (tx, rx) = events::channel();
    let orchestrator = Arc::new(NetworkOrchestrator::new(
        ShellRunner::new(),
        probe,
        settings,
        config.clone(),
        tx,
    ));

    Ok((orchestrator, rx, config))
}

/// Fail early with a setup error when NetworkManager's CLI is missing
fn ensure_nmcli() -> Result<(), KioskError> {
    which::which("nmcli").map(|_| ()).map_err(|_| {
        KioskError::Config(ConfigError::IoError {
            message: "nmcli not found in PATH (is NetworkManager installed?)".to_string(),
        })
    })
}

/// Run the scan command
pub async fn run_scan() -> Result<bool, KioskError> {
    let (orchestrator, mut rx, _config) = build_orchestrator()?;

    let result = orchestrator.scan_available_networks().await;
    if !result.success {
        print_failure("Scan failed", &result.error);
        return Ok(false);
    }

    // The parsed list arrives as a notification
    let mut networks = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let StatusEvent::ListOfNetworks(found) = event {
            networks = found;
        }
    }

    if networks.is_empty() {
        println!("No networks found.");
        return Ok(true);
    }

    println!("{} network(s) found:", networks.len());
    for network in &networks {
        let security = if network.security.is_empty() {
            "open".dimmed()
        } else {
            network.security.as_str().yellow()
        };
        println!("  {}  [{}]", network.ssid.bold(), security);
    }

    Ok(true)
}

/// Run the connect command
pub async fn run_connect(
    ssid: String,
    password: Option<String>,
    security: String,
    hidden: bool,
) -> Result<bool, KioskError> {
    // The orchestrator trusts its callers on this invariant, so enforce it
    // here at the outermost layer.
    let has_password = password.as_deref().map(|p| !p.is_empty()).unwrap_or(false);
    if security.contains("WPA") && !hidden && !has_password {
        return Err(KioskError::Config(ConfigError::ValidationError {
            message: format!(
                "network '{}' is WPA-protected; supply a password with --password",
                ssid
            ),
        }));
    }

    let (orchestrator, _rx, _config) = build_orchestrator()?;

    println!("Connecting to {}...", ssid.bold());
    let request = ConnectRequest::new(ssid.clone(), password.map(Psk::new), security, hidden);
    let result = orchestrator
        .connect_to_network(&request, &CancelToken::new())
        .await;

    if result.success {
        println!("{} Connected to {} and reached the server.", "✓".green(), ssid.bold());
        Ok(true)
    } else {
        print_failure("Connection failed", &result.error);
        if result.tag == Some(OutcomeTag::PskMismatch) {
            println!("The Wi-Fi password looks wrong; check it and try again.");
        }
        Ok(false)
    }
}

/// Run the status command
pub async fn run_status(json: bool) -> Result<bool, KioskError> {
    let (orchestrator, _rx, _config) = build_orchestrator()?;

    let report = orchestrator.check_network_connection().await;

    if json {
        // Same shape the UI/BLE front-ends consume
        match serde_json::to_string_pretty(&report) {
            Ok(rendered) => println!("{}", rendered),
            Err(e) => {
                eprintln!("Failed to render status report: {}", e);
                return Ok(false);
            }
        }
        return Ok(report.is_connected());
    }

    match report.connection_type {
        Some(LinkKind::Ethernet) => {
            println!("{} Connected via ethernet.", "✓".green());
        }
        Some(LinkKind::Wifi) => {
            let ssid = report.ssid.as_deref().unwrap_or("(unknown network)");
            println!("{} Connected via Wi-Fi: {}", "✓".green(), ssid.bold());
        }
        None => {
            print_failure("Not connected", &report.result.error);
        }
    }

    Ok(report.is_connected())
}

/// Run the reset command
pub async fn run_reset() -> Result<bool, KioskError> {
    let (orchestrator, _rx, _config) = build_orchestrator()?;

    let result = orchestrator.reset_all_connections().await;
    if result.success {
        println!("{} All connection profiles reset.", "✓".green());
        Ok(true)
    } else {
        print_failure("Reset failed", &result.error);
        Ok(false)
    }
}

/// Run the dns command
pub async fn run_dns(server: &str) -> Result<bool, KioskError> {
    let (orchestrator, _rx, _config) = build_orchestrator()?;

    let result = orchestrator.add_dns(server).await;
    if result.success {
        println!("{} DNS set to {}.", "✓".green(), server.bold());
        Ok(true)
    } else {
        print_failure("DNS change failed", &result.error);
        Ok(false)
    }
}

/// Run the watch-ethernet command
///
/// Blocks until the watcher reports a working wired link or the user
/// interrupts with Ctrl+C.
pub async fn run_watch_ethernet() -> Result<bool, KioskError> {
    let (orchestrator, mut rx, config) = build_orchestrator()?;

    let mut watcher = EthernetWatcher::new();
    watcher.start(orchestrator, config.ethernet_watch_interval());
    println!("Waiting for an ethernet link (Ctrl+C to stop)...");

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Some(StatusEvent::EthernetStatus(report)) if report.is_connected() => {
                    info!("ethernet watch completed");
                    println!("{} Ethernet link is up and the server is reachable.", "✓".green());
                    return Ok(true);
                }
                Some(_) => continue,
                None => return Ok(false),
            },
            _ = tokio::signal::ctrl_c() => {
                watcher.stop();
                println!("Stopped watching.");
                return Ok(false);
            }
        }
    }
}

fn print_failure(prefix: &str, error: &Option<String>) {
    match error {
        Some(error) => println!("{} {}: {}", "✗".red(), prefix, error),
        None => println!("{} {}.", "✗".red(), prefix),
    }
}
