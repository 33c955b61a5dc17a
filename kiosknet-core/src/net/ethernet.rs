//! Ethernet link watcher
//!
//! A recurring poll that waits for a wired link to come up (link connected
//! and server reachable), pushes a single `ethernet_status` notification,
//! then stops itself. At most one watch runs at a time.

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::net::command::CommandRunner;
use crate::net::events::StatusEvent;
use crate::net::orchestrator::NetworkOrchestrator;
use crate::net::probe::ReachabilityProbe;

/// Watches for an ethernet link coming up
#[derive(Debug, Default)]
pub struct EthernetWatcher {
    handle: Option<JoinHandle<()>>,
}

impl EthernetWatcher {
    /// Create a new, idle watcher
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a watch task is currently running
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().map(|h| !h.is_finished()).unwrap_or(false)
    }

    /// Start watching
    ///
    /// Polls the orchestrator's ethernet-only check every `interval`; on the
    /// first success it emits `ethernet_status` and the task exits. Returns
    /// false (and starts nothing) while a previous watch is still running —
    /// call [`stop`](Self::stop) first to replace it.
    pub fn start<R, P>(
        &mut self,
        orchestrator: Arc<NetworkOrchestrator<R, P>>,
        interval: Duration,
    ) -> bool
    where
        R: CommandRunner + 'static,
        P: ReachabilityProbe + 'static,
    {
        if self.is_running() {
            debug!("ethernet watch already running, not starting another");
            return false;
        }

        let events = orchestrator.event_sender();
        self.handle = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let report = orchestrator.check_ethernet_connection().await;
                if report.is_connected() {
                    info!("ethernet link is up and server is reachable");
                    let _ = events.send(StatusEvent::EthernetStatus(report));
                    break;
                }
                debug!("ethernet link not up yet");
            }
        }));

        true
    }

    /// Stop the current watch, if any
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            debug!("ethernet watch stopped");
        }
    }
}

impl Drop for EthernetWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}
