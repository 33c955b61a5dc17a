//! Network connection orchestrator
//!
//! Sequences nmcli invocations into high-level operations: connect with
//! activation polling and rollback, server reachability retry, bulk profile
//! reset, DNS override, and the composite status check. All failures are
//! returned as data; rollback (profile deletion) is best-effort and never
//! escalated.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::config::store::KEY_DNS;
use crate::config::{NetConfig, Settings};
use crate::net::classify::{self, ActivationState, ScanParser};
use crate::net::command::{nmcli, CommandResult, CommandRunner};
use crate::net::events::{EventSender, StatusEvent};
use crate::net::probe::ReachabilityProbe;
use crate::net::types::{ConnectRequest, OutcomeTag, StatusReport};

/// Cooperative cancellation for in-flight polling loops
///
/// Bounded iteration counts remain the backstop, but a caller (UI cancel
/// button, shutdown path) can flip the token to abort a poll early.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create a new, un-cancelled token
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of any loop holding this token
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation has been requested
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// The network orchestration core
///
/// Owns all previously process-global state (the last attempted SSID, the
/// single-flight connect gate) so sessions are isolated and testable.
pub struct NetworkOrchestrator<R, P> {
    runner: R,
    probe: P,
    events: EventSender,
    config: NetConfig,
    settings: Mutex<Settings>,
    scan_parser: ScanParser,

    /// SSID of the most recently *attempted* connection; tells the next
    /// attempt what to tear down. Cleared by every profile delete.
    last_ssid: Mutex<Option<String>>,

    /// Single-flight gate: at most one connect attempt in flight. A second
    /// concurrent call is rejected, not queued.
    connect_gate: tokio::sync::Mutex<()>,
}

impl<R, P> NetworkOrchestrator<R, P>
where
    R: CommandRunner,
    P: ReachabilityProbe,
{
    /// Create a new orchestrator
    pub fn new(runner: R, probe: P, settings: Settings, config: NetConfig, events: EventSender) -> Self {
        Self {
            runner,
            probe,
            events,
            config,
            settings: Mutex::new(settings),
            scan_parser: ScanParser::new(),
            last_ssid: Mutex::new(None),
            connect_gate: tokio::sync::Mutex::new(()),
        }
    }

    /// A clone of the notification sender, for collaborators that emit on the
    /// orchestrator's behalf (e.g. the ethernet watcher)
    pub fn event_sender(&self) -> EventSender {
        self.events.clone()
    }

    /// SSID of the most recently attempted connection, if still tracked
    pub fn last_attempted_ssid(&self) -> Option<String> {
        self.last_ssid.lock().unwrap().clone()
    }

    /// Statically configured DNS server, if one was stored
    pub fn configured_dns(&self) -> Option<String> {
        self.settings.lock().unwrap().get(KEY_DNS).map(String::from)
    }

    fn emit(&self, event: StatusEvent) {
        // Receiver may be gone during shutdown
        let _ = self.events.send(event);
    }

    /// Run a Wi-Fi scan
    ///
    /// Returns the raw command outcome; on success the parsed, deduplicated
    /// network list is also pushed as a `list_of_networks` notification.
    pub async fn scan_available_networks(&self) -> CommandResult {
        let result = self.runner.run(&nmcli::scan(), "wifi_scan").await;
        if result.success {
            let networks = self.scan_parser.parse(result.stdout_text());
            info!(count = networks.len(), "Wi-Fi scan completed");
            self.emit(StatusEvent::ListOfNetworks(networks));
        }
        result
    }

    /// Connect to a network
    ///
    /// Emits `is_connecting` before any command runs, tears down the
    /// previously attempted profile (best-effort), then dispatches on the
    /// request: hidden path, WPA path (security contains "WPA" and a password
    /// was supplied), or open path. The final outcome is both emitted as
    /// `connect_to_network_status` and returned.
    ///
    /// Only one attempt may be in flight; a concurrent call fails fast
    /// without emitting `is_connecting` or touching tracked state.
    pub async fn connect_to_network(
        &self,
        request: &ConnectRequest,
        cancel: &CancelToken,
    ) -> CommandResult {
        let _gate = match self.connect_gate.try_lock() {
            Ok(gate) => gate,
            Err(_) => {
                warn!(ssid = %request.ssid, "rejecting connect: another attempt is in flight");
                return CommandResult::failure("Another connection attempt is already in progress");
            }
        };

        self.emit(StatusEvent::IsConnecting);
        info!(ssid = %request.ssid, hidden = request.hidden, "starting connection attempt");

        // Tear down whatever we attempted last; the delete's own outcome does
        // not matter.
        let previous = self.last_ssid.lock().unwrap().clone();
        if let Some(previous) = previous {
            let _ = self.delete_connection_by_ssid(&previous).await;
        }
        *self.last_ssid.lock().unwrap() = Some(request.ssid.clone());

        let outcome = if request.hidden {
            self.connect_hidden(request, cancel).await
        } else if request.wants_psk() {
            let psk = request.password.as_ref().map(|p| p.expose()).unwrap_or("");
            let result = self
                .runner
                .run(&nmcli::connect_wpa(&request.ssid, psk), "connect_wpa")
                .await;
            self.resolve_connection(result, &request.ssid, cancel).await
        } else {
            let result = self
                .runner
                .run(&nmcli::connect_open(&request.ssid), "connect_open")
                .await;
            self.resolve_connection(result, &request.ssid, cancel).await
        };

        if outcome.success {
            info!(ssid = %request.ssid, "connection attempt succeeded");
        } else {
            warn!(ssid = %request.ssid, error = outcome.error.as_deref().unwrap_or(""), "connection attempt failed");
        }

        self.emit(StatusEvent::ConnectToNetworkStatus(outcome.clone()));
        outcome
    }

    /// Hidden-network path: create the profile, bring it up, probe the server
    ///
    /// Each step must textually affirm success before the next runs; any
    /// negative outcome deletes the just-created profile and returns the
    /// failing result.
    async fn connect_hidden(&self, request: &ConnectRequest, cancel: &CancelToken) -> CommandResult {
        let psk = request.password.as_ref().map(|p| p.expose());
        let add = self
            .runner
            .run(&nmcli::add_hidden_profile(&request.ssid, psk), "add_hidden_profile")
            .await;

        if !add.success {
            let _ = self.delete_connection_by_ssid(&request.ssid).await;
            return add;
        }
        if !classify::profile_added(&add.combined_text()) {
            let _ = self.delete_connection_by_ssid(&request.ssid).await;
            return CommandResult::failure("Connection add did not confirm success");
        }

        let up = self
            .runner
            .run(&nmcli::connection_up(&request.ssid), "connection_up")
            .await;

        if !up.success {
            let _ = self.delete_connection_by_ssid(&request.ssid).await;
            return up;
        }
        if !classify::profile_activated(&up.combined_text()) {
            let _ = self.delete_connection_by_ssid(&request.ssid).await;
            return CommandResult::failure("Connection did not confirm activation");
        }

        let probe = self.attempt_server_connection(cancel).await;
        if !probe.success {
            let _ = self.delete_connection_by_ssid(&request.ssid).await;
        }
        probe
    }

    /// Shared resolution routine for the open and WPA paths
    ///
    /// Propagates a failed initiating command unchanged (tagged when its
    /// output hints at a bad PSK — nothing was created, no rollback). On
    /// success, polls for activation and then probes the server, deleting the
    /// profile on either failure.
    pub async fn resolve_connection(
        &self,
        result: CommandResult,
        ssid: &str,
        cancel: &CancelToken,
    ) -> CommandResult {
        if !result.success {
            return if classify::psk_failure_hint(&result.combined_text()) {
                result.tagged(OutcomeTag::PskMismatch)
            } else {
                result
            };
        }

        let wait = self.wait_for_active_connection(ssid, cancel).await;
        if !wait.success {
            let _ = self.delete_connection_by_ssid(ssid).await;
            return wait;
        }

        let probe = self.attempt_server_connection(cancel).await;
        if !probe.success {
            // Likely a wrong password that nmcli accepted anyway; do not keep
            // the dead profile around.
            let _ = self.delete_connection_by_ssid(ssid).await;
        }
        probe
    }

    /// Poll the profile's activation state until it converges
    ///
    /// Terminal observations: "activated" succeeds; "deactivated" fails
    /// immediately; an unrecognized state right after "activating" is treated
    /// as a strong wrong-password signal and fails with the PSK tag.
    /// Exhausting the policy's iterations fails with "Exceeded maximum
    /// attempts."
    pub async fn wait_for_active_connection(
        &self,
        ssid: &str,
        cancel: &CancelToken,
    ) -> CommandResult {
        let policy = self.config.activation;
        let mut was_activating = false;

        for attempt in 0..policy.max_attempts {
            if cancel.is_cancelled() {
                return CommandResult::failure("Connection wait cancelled");
            }

            let state = self
                .runner
                .run(&nmcli::connection_state(ssid), "connection_state")
                .await;
            // A failed state query reads as Unknown, so a failure right after
            // "activating" also trips the wrong-password inference.
            let observed = classify::activation_state(state.stdout_text());
            debug!(ssid, attempt, ?observed, "activation poll");

            match observed {
                ActivationState::Activated => return state,
                ActivationState::Activating => was_activating = true,
                ActivationState::Deactivated => {
                    return CommandResult::failure("Connection state deactivating");
                }
                ActivationState::Unknown => {
                    if was_activating {
                        return CommandResult::failure(
                            "Connection state regressed while activating",
                        )
                        .tagged(OutcomeTag::PskMismatch);
                    }
                }
            }

            if attempt + 1 < policy.max_attempts {
                sleep(policy.interval()).await;
            }
        }

        CommandResult::failure("Exceeded maximum attempts.")
    }

    /// Retry the server reachability probe until it succeeds or the policy is
    /// exhausted; returns the last probe outcome either way
    pub async fn attempt_server_connection(&self, cancel: &CancelToken) -> CommandResult {
        let policy = self.config.server_probe;
        let mut last = CommandResult::failure("Server probe was not attempted");

        for attempt in 0..policy.max_attempts {
            if cancel.is_cancelled() {
                return CommandResult::failure("Server probe cancelled");
            }

            last = self.probe.check().await;
            if last.success {
                debug!(attempt, "server reachable");
                return last;
            }

            if attempt + 1 < policy.max_attempts {
                sleep(policy.interval()).await;
            }
        }

        last
    }

    /// Single server reachability check (the primitive the retry loop wraps)
    pub async fn check_connection_to_server(&self) -> CommandResult {
        self.probe.check().await
    }

    /// Delete a connection profile by SSID
    ///
    /// Unconditionally clears the attempted-SSID slot regardless of the
    /// delete's own outcome: stale tracking is worse than a harmless
    /// double-delete attempt later.
    pub async fn delete_connection_by_ssid(&self, ssid: &str) -> CommandResult {
        let result = self
            .runner
            .run(&nmcli::delete_profile(ssid), "delete_profile")
            .await;
        self.last_ssid.lock().unwrap().take();
        debug!(ssid, success = result.success, "deleted connection profile");
        result
    }

    /// Reset every known connection profile
    ///
    /// Wi-Fi profiles are deleted; ethernet profiles get their static DNS
    /// cleared and automatic DNS re-enabled. Per-entry failures are logged
    /// and skipped.
    pub async fn reset_all_connections(&self) -> CommandResult {
        let listing = self.runner.run(&nmcli::profile_list(), "profile_list").await;
        if !listing.success {
            return listing;
        }

        for (name, kind) in classify::parse_profile_list(listing.stdout_text()) {
            if classify::is_wifi_type(&kind) {
                let deleted = self.delete_connection_by_ssid(&name).await;
                if !deleted.success {
                    warn!(profile = %name, "failed to delete Wi-Fi profile during reset");
                }
            } else if classify::is_ethernet_type(&kind) {
                let cleared = self
                    .runner
                    .run(&nmcli::clear_static_dns(&name), "clear_static_dns")
                    .await;
                let restored = self
                    .runner
                    .run(&nmcli::enable_auto_dns(&name), "enable_auto_dns")
                    .await;
                if !cleared.success || !restored.success {
                    warn!(profile = %name, "failed to reset DNS on ethernet profile");
                }
            }
        }

        info!("reset all connection profiles");
        CommandResult::ok("")
    }

    /// Point the active connection profile at a static DNS server
    ///
    /// Resolves the active profile's UUID, sets the DNS, disables automatic
    /// DNS, then cycles the profile to apply. Any failed step short-circuits
    /// and returns that step's failure.
    pub async fn add_dns(&self, dns: &str) -> CommandResult {
        let lookup = self.runner.run(&nmcli::active_uuid(), "active_uuid").await;
        if !lookup.success {
            return lookup;
        }
        let Some(uuid) = classify::first_uuid(lookup.stdout_text()) else {
            return CommandResult::failure("No active connection profile found");
        };

        let steps = [
            (nmcli::set_static_dns(&uuid, dns), "set_static_dns"),
            (nmcli::disable_auto_dns(&uuid), "disable_auto_dns"),
            (nmcli::connection_down(&uuid), "connection_down"),
            (nmcli::connection_up(&uuid), "connection_up"),
        ];
        for (command, label) in steps {
            let result = self.runner.run(&command, label).await;
            if !result.success {
                return result;
            }
        }

        // Best-effort persistence; the DNS is already applied at this point.
        if let Err(e) = self.settings.lock().unwrap().set(KEY_DNS, dns) {
            warn!(error = %e, "applied DNS but failed to persist it");
        }

        info!(dns, "static DNS applied to active profile");
        CommandResult::ok("")
    }

    /// Ethernet-only status check: wired link up and server reachable
    pub async fn check_ethernet_connection(&self) -> StatusReport {
        let devices = self.runner.run(&nmcli::device_status(), "device_status").await;
        if devices.success && classify::has_connected_device(devices.stdout_text(), "ethernet") {
            let probe = self.check_connection_to_server().await;
            if probe.success {
                return StatusReport::ethernet(probe);
            }
        }
        StatusReport::disconnected(CommandResult::failure("Ethernet link is not up"))
    }

    /// Composite status check
    ///
    /// Ethernet is checked before Wi-Fi unconditionally: when both links
    /// exist we report the wired one. Each arm requires both the link and a
    /// successful server probe.
    pub async fn check_network_connection(&self) -> StatusReport {
        let ethernet = self.check_ethernet_connection().await;
        if ethernet.is_connected() {
            return ethernet;
        }

        let devices = self.runner.run(&nmcli::device_status(), "device_status").await;
        if devices.success && classify::has_connected_device(devices.stdout_text(), "wifi") {
            let probe = self.check_connection_to_server().await;
            if probe.success {
                let active = self
                    .runner
                    .run(&nmcli::active_profiles(), "active_profiles")
                    .await;
                let ssid = if active.success {
                    classify::active_wifi_name(active.stdout_text())
                } else {
                    None
                };
                return StatusReport::wifi(ssid, probe);
            }
        }

        StatusReport::disconnected(CommandResult::failure("No active connection"))
    }
}
