//! Data types threaded through the network orchestration core
//!
//! Includes the secrecy-wrapped PSK so Wi-Fi passwords are never accidentally
//! exposed in logs or debug output.

use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

use crate::net::command::CommandResult;

/// Heuristic classification tag attached to a failed connection outcome
///
/// This is a probabilistic inference from command text, not a guaranteed
/// diagnosis; front-ends use it only to pick a friendlier error message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeTag {
    /// The supplied Wi-Fi password is likely wrong
    #[serde(rename = "802-11-wireless-security.psk")]
    PskMismatch,
}

/// A network found by a Wi-Fi scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkDescriptor {
    /// Network name
    pub ssid: String,

    /// Security suite as reported by the scan (empty when open)
    pub security: String,
}

/// Wrapper for a Wi-Fi pre-shared key
///
/// Ensures the PSK never appears in logs or debug output; it is exposed only
/// at the single point where the connect command line is assembled.
#[derive(Clone, Debug)]
pub struct Psk(Secret<String>);

impl Psk {
    /// Create a new PSK from a caller-supplied password
    pub fn new(psk: String) -> Self {
        Self(Secret::new(psk))
    }

    /// Expose the PSK value (use with caution!)
    ///
    /// This should only be called when assembling the nmcli command line.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }

    /// Whether the wrapped PSK is the empty string
    pub fn is_empty(&self) -> bool {
        self.expose().is_empty()
    }
}

impl From<String> for Psk {
    fn from(psk: String) -> Self {
        Self::new(psk)
    }
}

/// Caller-supplied request to join a network
///
/// Invariant (enforced by the caller layer, not the orchestrator): if
/// `security` indicates a WPA-class network and `hidden` is false, `password`
/// must be non-empty.
#[derive(Debug, Clone)]
pub struct ConnectRequest {
    /// Network name to join
    pub ssid: String,

    /// Pre-shared key, absent for open networks
    pub password: Option<Psk>,

    /// Security suite string as reported by scanning (e.g. "WPA2")
    pub security: String,

    /// Whether the network does not broadcast its SSID
    pub hidden: bool,
}

impl ConnectRequest {
    /// Create a new connection request
    pub fn new(ssid: String, password: Option<Psk>, security: String, hidden: bool) -> Self {
        Self {
            ssid,
            password,
            security,
            hidden,
        }
    }

    /// Whether this request takes the WPA path: security names a WPA-class
    /// suite (case-sensitive) and a non-empty password was supplied
    pub fn wants_psk(&self) -> bool {
        self.security.contains("WPA")
            && self.password.as_ref().map(|p| !p.is_empty()).unwrap_or(false)
    }
}

/// Kind of link carrying the device's connectivity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    #[serde(rename = "Ethernet")]
    Ethernet,
    #[serde(rename = "Wi-Fi")]
    Wifi,
}

/// Composite connection status report
///
/// Produced by the composite status check and forwarded as the
/// `ethernet_status` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Link kind, absent when nothing is connected
    #[serde(rename = "connectionType")]
    pub connection_type: Option<LinkKind>,

    /// Active SSID for Wi-Fi links
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssid: Option<String>,

    /// The underlying probe/check outcome
    #[serde(flatten)]
    pub result: CommandResult,
}

impl StatusReport {
    /// Report a working ethernet link
    pub fn ethernet(result: CommandResult) -> Self {
        Self {
            connection_type: Some(LinkKind::Ethernet),
            ssid: None,
            result,
        }
    }

    /// Report a working Wi-Fi link
    pub fn wifi(ssid: Option<String>, result: CommandResult) -> Self {
        Self {
            connection_type: Some(LinkKind::Wifi),
            ssid,
            result,
        }
    }

    /// Report the absence of a working link
    pub fn disconnected(result: CommandResult) -> Self {
        Self {
            connection_type: None,
            ssid: None,
            result,
        }
    }

    /// Whether the report describes a link that also reached the server
    pub fn is_connected(&self) -> bool {
        self.connection_type.is_some() && self.result.success
    }
}
