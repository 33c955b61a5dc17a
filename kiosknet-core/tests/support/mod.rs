// Shared scripted fakes for orchestration flow tests
#![allow(dead_code)]

use kiosknet_core::config::{NetConfig, PollPolicy, Settings};
use kiosknet_core::net::events::{self, EventReceiver};
use kiosknet_core::net::{CommandResult, CommandRunner, NetworkOrchestrator, ReachabilityProbe};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

/// Command runner driven by a closure, recording every command it sees
///
/// Cheaply cloneable: clones share the same log, so a test can keep a handle
/// while the orchestrator owns another.
#[derive(Clone)]
pub struct ScriptedRunner {
    inner: Arc<RunnerInner>,
}

struct RunnerInner {
    delay: Option<Duration>,
    script: Box<dyn Fn(&str) -> CommandResult + Send + Sync>,
    log: Mutex<Vec<String>>,
}

impl ScriptedRunner {
    pub fn new(script: impl Fn(&str) -> CommandResult + Send + Sync + 'static) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                delay: None,
                script: Box::new(script),
                log: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Runner that answers every command with a plain success
    pub fn always_ok() -> Self {
        Self::new(|_| CommandResult::ok(""))
    }

    /// Runner that sleeps before answering, to keep an operation in flight
    pub fn slow(script: impl Fn(&str) -> CommandResult + Send + Sync + 'static, delay: Duration) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                delay: Some(delay),
                script: Box::new(script),
                log: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn commands(&self) -> Vec<String> {
        self.inner.log.lock().unwrap().clone()
    }

    pub fn count_containing(&self, needle: &str) -> usize {
        self.inner
            .log
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.contains(needle))
            .count()
    }
}

impl CommandRunner for ScriptedRunner {
    async fn run(&self, command: &str, _label: &str) -> CommandResult {
        if let Some(delay) = self.inner.delay {
            tokio::time::sleep(delay).await;
        }
        self.inner.log.lock().unwrap().push(command.to_string());
        (self.inner.script)(command)
    }
}

/// Runner that answers activation state queries from a fixed sequence and
/// everything else with success
pub fn state_sequence_runner(states: &[&str]) -> ScriptedRunner {
    let queue: Arc<Mutex<VecDeque<String>>> =
        Arc::new(Mutex::new(states.iter().map(|s| s.to_string()).collect()));
    ScriptedRunner::new(move |command| {
        if command.contains("GENERAL.STATE") {
            let state = queue
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| "unknown".to_string());
            CommandResult::ok(state)
        } else {
            CommandResult::ok("")
        }
    })
}

/// Reachability probe answering from a fixed outcome sequence; the last
/// outcome repeats once the sequence is exhausted
///
/// Cloneable like [`ScriptedRunner`], sharing its call counter.
#[derive(Clone)]
pub struct ScriptedProbe {
    inner: Arc<ProbeInner>,
}

struct ProbeInner {
    outcomes: Mutex<VecDeque<CommandResult>>,
    calls: AtomicUsize,
}

impl ScriptedProbe {
    pub fn sequence(outcomes: Vec<CommandResult>) -> Self {
        assert!(!outcomes.is_empty(), "probe script cannot be empty");
        Self {
            inner: Arc::new(ProbeInner {
                outcomes: Mutex::new(outcomes.into()),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn reachable() -> Self {
        Self::sequence(vec![probe_up()])
    }

    pub fn unreachable() -> Self {
        Self::sequence(vec![probe_down()])
    }

    pub fn call_count(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }
}

impl ReachabilityProbe for ScriptedProbe {
    async fn check(&self) -> CommandResult {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let mut outcomes = self.inner.outcomes.lock().unwrap();
        if outcomes.len() > 1 {
            outcomes.pop_front().unwrap()
        } else {
            outcomes.front().cloned().unwrap()
        }
    }
}

/// Probe outcome for a reachable server
pub fn probe_up() -> CommandResult {
    CommandResult::ok("1")
}

/// Probe outcome for an unreachable server
pub fn probe_down() -> CommandResult {
    CommandResult::failure("Server returned status 503").with_stdout("0")
}

/// Config with production iteration counts but millisecond intervals
pub fn fast_config() -> NetConfig {
    NetConfig {
        host: "device.test".to_string(),
        activation: PollPolicy::new(75, 1),
        server_probe: PollPolicy::new(20, 1),
        probe_timeout_secs: 1,
        ethernet_watch_interval_secs: 1,
    }
}

/// Build an orchestrator over scripted collaborators
///
/// The returned TempDir keeps the settings store alive for the test's
/// duration; clone the runner/probe before calling to keep inspection
/// handles.
pub fn orchestrator(
    runner: ScriptedRunner,
    probe: ScriptedProbe,
) -> (
    Arc<NetworkOrchestrator<ScriptedRunner, ScriptedProbe>>,
    EventReceiver,
    TempDir,
) {
    orchestrator_with_config(runner, probe, fast_config())
}

pub fn orchestrator_with_config(
    runner: ScriptedRunner,
    probe: ScriptedProbe,
    config: NetConfig,
) -> (
    Arc<NetworkOrchestrator<ScriptedRunner, ScriptedProbe>>,
    EventReceiver,
    TempDir,
) {
    let dir = tempfile::tempdir().unwrap();
    let settings = Settings::open(dir.path().join("settings.toml")).unwrap();
    let (tx, rx) = events::channel();
    let orch = Arc::new(NetworkOrchestrator::new(runner, probe, settings, config, tx));
    (orch, rx, dir)
}
