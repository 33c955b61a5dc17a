// Tests for the self-stopping ethernet link watcher

mod support;

use kiosknet_core::net::{CommandResult, EthernetWatcher, LinkKind, StatusEvent};
use std::time::Duration;
use support::{orchestrator, ScriptedProbe, ScriptedRunner};

fn ethernet_up_runner() -> ScriptedRunner {
    ScriptedRunner::new(|command| {
        if command.contains("-f DEVICE,TYPE,STATE") {
            CommandResult::ok("eth0:ethernet:connected")
        } else {
            CommandResult::ok("")
        }
    })
}

fn ethernet_down_runner() -> ScriptedRunner {
    ScriptedRunner::new(|command| {
        if command.contains("-f DEVICE,TYPE,STATE") {
            CommandResult::ok("eth0:ethernet:unavailable")
        } else {
            CommandResult::ok("")
        }
    })
}

#[tokio::test]
async fn test_watcher_emits_status_and_stops_itself() {
    let (orch, mut rx, _dir) = orchestrator(ethernet_up_runner(), ScriptedProbe::reachable());

    let mut watcher = EthernetWatcher::new();
    assert!(watcher.start(orch, Duration::from_millis(5)));

    let event = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("watcher never reported")
        .expect("event channel closed");

    match event {
        StatusEvent::EthernetStatus(report) => {
            assert!(report.is_connected());
            assert_eq!(report.connection_type, Some(LinkKind::Ethernet));
        }
        other => panic!("expected ethernet status, got {:?}", other),
    }

    // The task exits right after emitting
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!watcher.is_running());
}

#[tokio::test]
async fn test_watcher_keeps_polling_while_link_is_down() {
    let runner = ethernet_down_runner();
    let (orch, mut rx, _dir) = orchestrator(runner.clone(), ScriptedProbe::reachable());

    let mut watcher = EthernetWatcher::new();
    assert!(watcher.start(orch, Duration::from_millis(5)));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(watcher.is_running());
    assert!(runner.count_containing("-f DEVICE,TYPE,STATE") > 1);
    assert!(rx.try_recv().is_err());

    watcher.stop();
}

#[tokio::test]
async fn test_second_start_is_refused_while_running() {
    let (orch, _rx, _dir) = orchestrator(ethernet_down_runner(), ScriptedProbe::reachable());

    let mut watcher = EthernetWatcher::new();
    assert!(watcher.start(orch.clone(), Duration::from_millis(5)));
    assert!(!watcher.start(orch, Duration::from_millis(5)));

    watcher.stop();
}

#[tokio::test]
async fn test_stop_allows_a_fresh_start() {
    let (orch, _rx, _dir) = orchestrator(ethernet_down_runner(), ScriptedProbe::reachable());

    let mut watcher = EthernetWatcher::new();
    assert!(watcher.start(orch.clone(), Duration::from_millis(5)));

    watcher.stop();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!watcher.is_running());

    assert!(watcher.start(orch, Duration::from_millis(5)));
    watcher.stop();
}

#[tokio::test]
async fn test_idle_watcher_is_not_running() {
    let watcher = EthernetWatcher::new();
    assert!(!watcher.is_running());
}
