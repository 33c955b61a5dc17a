//! State-change notifications pushed to UI/BLE front-ends
//!
//! The orchestrator emits events over an unbounded channel; the companion
//! processes forward them verbatim, so the serde names here are the wire
//! contract.

use serde::Serialize;
use tokio::sync::mpsc;

use crate::net::command::CommandResult;
use crate::net::types::{NetworkDescriptor, StatusReport};

/// Sender half of the notification channel
pub type EventSender = mpsc::UnboundedSender<StatusEvent>;

/// Receiver half of the notification channel
pub type EventReceiver = mpsc::UnboundedReceiver<StatusEvent>;

/// Create a notification channel pair
pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Events emitted by the orchestration core
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum StatusEvent {
    /// A connection attempt has started (emitted before any command runs)
    IsConnecting,

    /// Final outcome of a connection attempt
    ConnectToNetworkStatus(CommandResult),

    /// Ordered result of a Wi-Fi scan
    ListOfNetworks(Vec<NetworkDescriptor>),

    /// The ethernet watcher confirmed a working wired link
    EthernetStatus(StatusReport),
}
