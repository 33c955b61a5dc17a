//! kiosknet - network setup CLI for kiosk-mode devices
//!
//! Drives the orchestration core in `kiosknet-core` from the command line:
//! Wi-Fi scanning, connecting with server verification and rollback, DNS
//! override, bulk reset, and ethernet watching.

use clap::{Parser, Subcommand};
use kiosknet_core::{error::KioskError, init_logging};

mod cli;

#[derive(Parser)]
#[command(name = "kiosknet")]
#[command(about = "Network setup orchestrator for kiosk-mode devices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan for visible Wi-Fi networks
    Scan,
    /// Connect to a Wi-Fi network and verify server reachability
    Connect {
        /// Network name to join
        ssid: String,
        /// Pre-shared key (required for WPA-protected networks)
        #[arg(short, long)]
        password: Option<String>,
        /// Security suite as reported by scanning (e.g. "WPA2")
        #[arg(short, long, default_value = "")]
        security: String,
        /// The network does not broadcast its SSID
        #[arg(long)]
        hidden: bool,
    },
    /// Show the current connection status
    Status {
        /// Print the raw status report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete all Wi-Fi profiles and restore automatic DNS on ethernet
    Reset,
    /// Point the active connection profile at a static DNS server
    Dns {
        /// DNS server address
        server: String,
    },
    /// Wait for an ethernet link to come up and reach the server
    WatchEthernet,
}

#[tokio::main]
async fn main() {
    // Initialize logging
    if let Err(e) = init_logging() {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Scan => cli::network::run_scan().await,
        Commands::Connect {
            ssid,
            password,
            security,
            hidden,
        } => cli::network::run_connect(ssid, password, security, hidden).await,
        Commands::Status { json } => cli::network::run_status(json).await,
        Commands::Reset => cli::network::run_reset().await,
        Commands::Dns { server } => cli::network::run_dns(&server).await,
        Commands::WatchEthernet => cli::network::run_watch_ethernet().await,
    };

    match result {
        // The operation ran; its own outcome decides the exit code
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            let exit_code = match e {
                // Configuration/setup errors (exit code 2)
                KioskError::Config(_)
                | KioskError::Settings(_)
                | KioskError::Probe(_)
                | KioskError::Toml(_)
                | KioskError::TomlSerialize(_) => 2,
                // IO errors (exit code 1 - runtime)
                KioskError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
