//! Server reachability probing via HTTPS
//!
//! A link being up says nothing about whether the kiosk can reach its
//! backend; the probe answers that. Output keeps the historical `"1"`/`"0"`
//! stdout contract so front-ends need not change.

use reqwest::{Client, StatusCode};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

use crate::error::ProbeError;
use crate::net::command::CommandResult;

/// Performs a single server reachability check
///
/// Trait seam so orchestration flows can be exercised with scripted probes.
pub trait ReachabilityProbe: Send + Sync {
    fn check(&self) -> impl Future<Output = CommandResult> + Send;
}

/// Production probe: HEAD request against the configured host
#[derive(Debug)]
pub struct HttpProbe {
    client: Client,
    endpoint: String,
}

impl HttpProbe {
    /// Create a new probe
    ///
    /// # Arguments
    /// * `endpoint` - HTTP/HTTPS URL to check
    /// * `timeout` - Maximum duration to wait for a response
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, ProbeError> {
        let url = Url::parse(&endpoint)
            .map_err(|e| ProbeError::InvalidUrl(format!("Failed to parse URL: {}", e)))?;

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(ProbeError::InvalidUrl(format!(
                    "Only HTTP/HTTPS schemes are supported, got: {}",
                    scheme
                )));
            }
        }

        let client = Client::builder().timeout(timeout).use_rustls_tls().build()?;

        Ok(Self { client, endpoint })
    }

    /// Probe endpoint for a bare hostname from settings
    pub fn endpoint_for_host(host: &str) -> String {
        format!("https://{}", host)
    }
}

impl ReachabilityProbe for HttpProbe {
    /// Perform a reachability check
    ///
    /// Returns stdout `"1"` on HTTP 200; `"0"` with error context on any
    /// other status or on a transport-level failure.
    async fn check(&self) -> CommandResult {
        match self.client.head(&self.endpoint).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::OK {
                    debug!(endpoint = %self.endpoint, "server reachable");
                    CommandResult::ok("1")
                } else {
                    warn!(endpoint = %self.endpoint, %status, "server returned non-200");
                    CommandResult::failure(format!("Server returned status {}", status))
                        .with_stdout("0")
                }
            }
            Err(e) => {
                let reason = if e.is_timeout() {
                    "Request timed out".to_string()
                } else if e.is_connect() {
                    "Connection refused or unreachable".to_string()
                } else {
                    format!("Request failed: {}", e)
                };
                warn!(endpoint = %self.endpoint, error = %reason, "server unreachable");
                CommandResult::failure(reason).with_stdout("0")
            }
        }
    }
}
