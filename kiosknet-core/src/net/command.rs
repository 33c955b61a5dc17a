//! Shell command execution boundary
//!
//! Every OS-level operation goes through [`CommandRunner`] and comes back as
//! a [`CommandResult`]: failures surface as data, never as panics or errors
//! crossing this boundary.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

use crate::net::types::OutcomeTag;

/// Universal result shape for every executed command
///
/// Invariant: `success == false` implies `error` is present; the constructors
/// enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// Heuristic failure classification for front-end messaging
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<OutcomeTag>,

    /// Whether the operation achieved its desired state
    pub success: bool,

    /// Trimmed standard output, absent on failure to execute
    pub stdout: Option<String>,

    /// Trimmed standard error, absent on failure to execute
    pub stderr: Option<String>,

    /// Failure context, present exactly when `success` is false
    pub error: Option<String>,
}

impl CommandResult {
    /// Successful outcome with the given (already trimmed) stdout
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            tag: None,
            success: true,
            stdout: Some(stdout.into()),
            stderr: None,
            error: None,
        }
    }

    /// Failed outcome carrying error context
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            tag: None,
            success: false,
            stdout: None,
            stderr: None,
            error: Some(error.into()),
        }
    }

    /// Attach stdout to this result (used by the reachability probe, which
    /// reports `"0"` alongside its error context)
    pub fn with_stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    /// Attach stderr to this result
    pub fn with_stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    /// Attach a heuristic classification tag
    pub fn tagged(mut self, tag: OutcomeTag) -> Self {
        self.tag = Some(tag);
        self
    }

    /// Stdout as text, empty when absent
    pub fn stdout_text(&self) -> &str {
        self.stdout.as_deref().unwrap_or("")
    }

    /// All textual output joined, for the free-text classifiers
    pub fn combined_text(&self) -> String {
        [&self.stdout, &self.stderr, &self.error]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Executes a single shell command
///
/// Implementations must trim stdout/stderr and must never panic or return an
/// error past this boundary; all failures surface as `success == false` with
/// an error payload. `label` is a short, secret-free name for the operation
/// used in logs, since command lines may embed credentials.
pub trait CommandRunner: Send + Sync {
    fn run(&self, command: &str, label: &str) -> impl Future<Output = CommandResult> + Send;
}

/// Production runner: executes commands through `sh -c`
#[derive(Debug, Clone, Default)]
pub struct ShellRunner;

impl ShellRunner {
    /// Create a new shell runner
    pub fn new() -> Self {
        Self
    }
}

impl CommandRunner for ShellRunner {
    async fn run(&self, command: &str, label: &str) -> CommandResult {
        debug!(label, "executing shell command");

        let output = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .output()
            .await;

        match output {
            Ok(output) => {
                let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();
                let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();

                if output.status.success() {
                    debug!(label, "command succeeded");
                    CommandResult::ok(stdout).with_stderr(stderr)
                } else {
                    debug!(label, status = %output.status, "command failed");
                    let context = if stderr.is_empty() { &stdout } else { &stderr };
                    CommandResult::failure(format!(
                        "Command {} exited with {}: {}",
                        label, output.status, context
                    ))
                }
            }
            Err(e) => {
                debug!(label, error = %e, "failed to spawn command");
                CommandResult::failure(format!("Failed to spawn command {}: {}", label, e))
            }
        }
    }
}

/// Quote a value for safe interpolation into an `sh -c` command line
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// nmcli command-line builders
///
/// The textual surface stays bit-compatible with the NetworkManager CLI the
/// classifiers were written against.
pub mod nmcli {
    use super::shell_quote;

    /// Wi-Fi profile type as reported by `nmcli connection show`
    pub const WIFI_TYPE: &str = "802-11-wireless";

    /// Ethernet profile type as reported by `nmcli connection show`
    pub const ETHERNET_TYPE: &str = "802-3-ethernet";

    pub fn scan() -> String {
        "nmcli -f SSID,SECURITY -m multiline device wifi list".to_string()
    }

    pub fn connect_open(ssid: &str) -> String {
        format!("nmcli device wifi connect {}", shell_quote(ssid))
    }

    pub fn connect_wpa(ssid: &str, psk: &str) -> String {
        format!(
            "nmcli device wifi connect {} password {}",
            shell_quote(ssid),
            shell_quote(psk)
        )
    }

    /// Create (without activating) a profile for a non-broadcasting network
    pub fn add_hidden_profile(ssid: &str, psk: Option<&str>) -> String {
        let base = format!(
            "nmcli connection add type wifi con-name {} ifname '*' ssid {} wifi.hidden yes",
            shell_quote(ssid),
            shell_quote(ssid)
        );
        match psk {
            Some(psk) => format!(
                "{} wifi-sec.key-mgmt wpa-psk wifi-sec.psk {}",
                base,
                shell_quote(psk)
            ),
            None => base,
        }
    }

    pub fn connection_up(id: &str) -> String {
        format!("nmcli connection up {}", shell_quote(id))
    }

    pub fn connection_down(id: &str) -> String {
        format!("nmcli connection down {}", shell_quote(id))
    }

    pub fn delete_profile(id: &str) -> String {
        format!("nmcli connection delete {}", shell_quote(id))
    }

    pub fn connection_state(id: &str) -> String {
        format!("nmcli -f GENERAL.STATE connection show {}", shell_quote(id))
    }

    pub fn profile_list() -> String {
        "nmcli -t -f NAME,TYPE connection show".to_string()
    }

    pub fn active_profiles() -> String {
        "nmcli -t -f NAME,TYPE connection show --active".to_string()
    }

    pub fn active_uuid() -> String {
        "nmcli -t -f UUID connection show --active".to_string()
    }

    pub fn device_status() -> String {
        "nmcli -t -f DEVICE,TYPE,STATE device status".to_string()
    }

    pub fn set_static_dns(id: &str, dns: &str) -> String {
        format!(
            "nmcli connection modify {} ipv4.dns {}",
            shell_quote(id),
            shell_quote(dns)
        )
    }

    pub fn disable_auto_dns(id: &str) -> String {
        format!(
            "nmcli connection modify {} ipv4.ignore-auto-dns yes",
            shell_quote(id)
        )
    }

    pub fn clear_static_dns(id: &str) -> String {
        format!("nmcli connection modify {} ipv4.dns ''", shell_quote(id))
    }

    pub fn enable_auto_dns(id: &str) -> String {
        format!(
            "nmcli connection modify {} ipv4.ignore-auto-dns no",
            shell_quote(id)
        )
    }
}
