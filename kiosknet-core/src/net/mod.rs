//! Network orchestration module
//!
//! Turns declarative intents ("connect to this network", "what is our
//! connection status") into sequences of nmcli invocations with convergence
//! polling, server reachability probing, and best-effort rollback.

pub mod classify;
pub mod command;
pub mod ethernet;
pub mod events;
pub mod orchestrator;
pub mod probe;
pub mod types;

// Public re-exports
pub use command::{CommandResult, CommandRunner, ShellRunner};
pub use ethernet::EthernetWatcher;
pub use events::{EventReceiver, EventSender, StatusEvent};
pub use orchestrator::{CancelToken, NetworkOrchestrator};
pub use probe::{HttpProbe, ReachabilityProbe};
pub use types::{ConnectRequest, LinkKind, NetworkDescriptor, OutcomeTag, Psk, StatusReport};
