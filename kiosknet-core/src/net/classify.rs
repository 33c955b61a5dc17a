//! Free-text classifiers for nmcli output
//!
//! All substring/pattern heuristics the orchestrator relies on live here as
//! named pure functions, so the fragile string-matching surface stays
//! unit-testable without touching a shell.

use crate::net::command::nmcli::{ETHERNET_TYPE, WIFI_TYPE};
use crate::net::types::NetworkDescriptor;
use regex::Regex;

/// Activation state of a connection profile, as read from state-query output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    /// Profile is carrying traffic
    Activated,
    /// Profile is still coming up
    Activating,
    /// Profile was torn down
    Deactivated,
    /// State text matched nothing we recognize
    Unknown,
}

/// Classify connection state-query output
///
/// Checks "deactivated" first: "activated" is a substring of it, so the
/// match order matters.
pub fn activation_state(text: &str) -> ActivationState {
    if text.contains("deactivated") {
        ActivationState::Deactivated
    } else if text.contains("activating") {
        ActivationState::Activating
    } else if text.contains("activated") {
        ActivationState::Activated
    } else {
        ActivationState::Unknown
    }
}

/// Whether profile-add output affirms the profile was created
///
/// nmcli prints e.g. "Connection 'Home' (uuid ...) successfully added."
pub fn profile_added(text: &str) -> bool {
    text.contains("successfully added")
}

/// Whether connection-up output affirms the profile activated
///
/// nmcli prints e.g. "Connection successfully activated (D-Bus active path ...)".
pub fn profile_activated(text: &str) -> bool {
    text.contains("successfully activated")
}

/// Whether command output hints at a wrong pre-shared key
///
/// A heuristic, not a diagnosis: nmcli surfaces bad PSKs as secret-request
/// failures naming the `802-11-wireless-security.psk` setting.
pub fn psk_failure_hint(text: &str) -> bool {
    text.contains("802-11-wireless-security.psk") || text.contains("Secrets were required")
}

/// Parser for multiline Wi-Fi scan output
///
/// Expects `nmcli -f SSID,SECURITY -m multiline device wifi list` records:
/// an `SSID:` line opens an entry; the next `SECURITY:` line found scanning
/// forward (not necessarily adjacent) supplies its security, empty string if
/// none appears before the output ends.
pub struct ScanParser {
    ssid_pattern: Regex,
    security_pattern: Regex,
}

impl ScanParser {
    /// Create a new ScanParser with compiled patterns
    pub fn new() -> Self {
        Self {
            ssid_pattern: Regex::new(r"^SSID:\s*(.*)$").expect("Failed to compile ssid pattern"),
            security_pattern: Regex::new(r"^SECURITY:\s*(.*)$")
                .expect("Failed to compile security pattern"),
        }
    }

    /// Parse scan output into an ordered, SSID-deduplicated network list
    ///
    /// Duplicate SSIDs keep their first occurrence; blank SSIDs are dropped.
    /// Pure and re-invocable: output order equals scan order.
    pub fn parse(&self, text: &str) -> Vec<NetworkDescriptor> {
        let lines: Vec<&str> = text.lines().collect();
        let mut networks: Vec<NetworkDescriptor> = Vec::new();

        for (index, line) in lines.iter().enumerate() {
            let Some(captures) = self.ssid_pattern.captures(line.trim_end()) else {
                continue;
            };
            let ssid = captures[1].trim().to_string();
            if ssid.is_empty() {
                continue;
            }
            if networks.iter().any(|n| n.ssid == ssid) {
                continue;
            }

            let security = lines[index + 1..]
                .iter()
                .find_map(|later| self.security_pattern.captures(later.trim_end()))
                .map(|c| c[1].trim().to_string())
                .unwrap_or_default();

            networks.push(NetworkDescriptor { ssid, security });
        }

        networks
    }
}

impl Default for ScanParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse terse `NAME:TYPE` profile-list output into (name, type) pairs
pub fn parse_profile_list(text: &str) -> Vec<(String, String)> {
    text.lines()
        .filter_map(|line| {
            let (name, kind) = line.split_once(':')?;
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), kind.trim().to_string()))
        })
        .collect()
}

/// Whether terse `DEVICE:TYPE:STATE` device-status output shows a connected
/// device of the given type
pub fn has_connected_device(text: &str, device_type: &str) -> bool {
    text.lines().any(|line| {
        let mut fields = line.split(':');
        let _device = fields.next();
        let kind = fields.next().unwrap_or("");
        let state = fields.next().unwrap_or("");
        kind == device_type && state.trim() == "connected"
    })
}

/// First UUID from terse `UUID` listing output
pub fn first_uuid(text: &str) -> Option<String> {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(String::from)
}

/// Name of the active Wi-Fi profile from terse `NAME:TYPE` output
pub fn active_wifi_name(text: &str) -> Option<String> {
    parse_profile_list(text)
        .into_iter()
        .find(|(_, kind)| kind.contains(WIFI_TYPE))
        .map(|(name, _)| name)
}

/// Whether a profile type string names a Wi-Fi profile
pub fn is_wifi_type(kind: &str) -> bool {
    kind.contains(WIFI_TYPE)
}

/// Whether a profile type string names an ethernet profile
pub fn is_ethernet_type(kind: &str) -> bool {
    kind.contains(ETHERNET_TYPE)
}
