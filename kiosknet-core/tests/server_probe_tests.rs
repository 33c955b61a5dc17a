// Tests for the bounded server reachability retry loop

mod support;

use kiosknet_core::net::CancelToken;
use support::{orchestrator, probe_down, probe_up, ScriptedProbe, ScriptedRunner};

#[tokio::test]
async fn test_succeeds_on_twentieth_attempt() {
    let mut outcomes = vec![probe_down(); 19];
    outcomes.push(probe_up());
    let probe = ScriptedProbe::sequence(outcomes);
    let (orch, _rx, _dir) = orchestrator(ScriptedRunner::always_ok(), probe.clone());

    let result = orch.attempt_server_connection(&CancelToken::new()).await;

    assert!(result.success);
    assert_eq!(result.stdout.as_deref(), Some("1"));
    assert_eq!(probe.call_count(), 20);
}

#[tokio::test]
async fn test_twenty_failures_is_overall_failure() {
    let probe = ScriptedProbe::unreachable();
    let (orch, _rx, _dir) = orchestrator(ScriptedRunner::always_ok(), probe.clone());

    let result = orch.attempt_server_connection(&CancelToken::new()).await;

    assert!(!result.success);
    assert_eq!(result.stdout.as_deref(), Some("0"));
    assert!(result.error.is_some());
    assert_eq!(probe.call_count(), 20);
}

#[tokio::test]
async fn test_first_success_short_circuits() {
    let probe = ScriptedProbe::reachable();
    let (orch, _rx, _dir) = orchestrator(ScriptedRunner::always_ok(), probe.clone());

    let result = orch.attempt_server_connection(&CancelToken::new()).await;

    assert!(result.success);
    assert_eq!(probe.call_count(), 1);
}

#[tokio::test]
async fn test_cancelled_token_aborts_retry() {
    let probe = ScriptedProbe::unreachable();
    let (orch, _rx, _dir) = orchestrator(ScriptedRunner::always_ok(), probe.clone());

    let cancel = CancelToken::new();
    cancel.cancel();
    let result = orch.attempt_server_connection(&cancel).await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Server probe cancelled"));
    assert_eq!(probe.call_count(), 0);
}

#[tokio::test]
async fn test_single_check_does_not_retry() {
    let probe = ScriptedProbe::unreachable();
    let (orch, _rx, _dir) = orchestrator(ScriptedRunner::always_ok(), probe.clone());

    let result = orch.check_connection_to_server().await;

    assert!(!result.success);
    assert_eq!(probe.call_count(), 1);
}
