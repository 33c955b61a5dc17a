// HTTP reachability probe tests against a local mock server

use kiosknet_core::net::{HttpProbe, ReachabilityProbe};
use std::time::Duration;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_http_200_reports_reachable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(server.uri(), Duration::from_secs(5)).unwrap();
    let result = probe.check().await;

    assert!(result.success);
    assert_eq!(result.stdout.as_deref(), Some("1"));
    assert!(result.error.is_none());
}

#[tokio::test]
async fn test_non_200_reports_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(server.uri(), Duration::from_secs(5)).unwrap();
    let result = probe.check().await;

    assert!(!result.success);
    assert_eq!(result.stdout.as_deref(), Some("0"));
    assert!(result.error.as_deref().unwrap().contains("500"));
}

#[tokio::test]
async fn test_non_ok_success_status_is_not_reachable() {
    // Only a literal 200 counts
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(server.uri(), Duration::from_secs(5)).unwrap();
    let result = probe.check().await;

    assert!(!result.success);
    assert_eq!(result.stdout.as_deref(), Some("0"));
}

#[tokio::test]
async fn test_connection_refused_reports_unreachable() {
    // Nothing listens on this port once the server is dropped
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let probe = HttpProbe::new(uri, Duration::from_secs(1)).unwrap();
    let result = probe.check().await;

    assert!(!result.success);
    assert_eq!(result.stdout.as_deref(), Some("0"));
    assert!(result.error.is_some());
}

#[tokio::test]
async fn test_timeout_reports_unreachable() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let probe = HttpProbe::new(server.uri(), Duration::from_millis(100)).unwrap();
    let result = probe.check().await;

    assert!(!result.success);
    assert_eq!(result.error.as_deref(), Some("Request timed out"));
}
