/// Forwarding of unexpected errors to an external reporting service
///
/// Mirrors the usual hosted-error-tracker integration: when a request ends
/// in a 500, a small JSON payload is POSTed to the configured endpoint.
/// Reporting is fire-and-forget; a failed delivery is logged and dropped,
/// it must never affect the response.
///
/// With no endpoint configured the reporter is inert, which is the default
/// in development and tests.

use crate::config::ReportConfig;
use serde_json::json;
use tracing::{debug, warn};

/// Handle for shipping error payloads
///
/// Cheap to clone; lives in the application state.
#[derive(Debug, Clone)]
pub struct ErrorReporter {
    client: reqwest::Client,
    endpoint: Option<String>,
    token: Option<String>,
}

impl ErrorReporter {
    /// Builds a reporter from configuration
    pub fn new(config: &ReportConfig) -> Self {
        if config.endpoint.is_some() {
            debug!("Error reporting enabled");
        } else {
            debug!("Error reporting disabled (no endpoint configured)");
        }

        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            token: config.token.clone(),
        }
    }

    /// Reporter that never sends anything
    pub fn disabled() -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: None,
            token: None,
        }
    }

    /// Ships an error payload in the background
    ///
    /// Returns immediately; delivery happens on a spawned task.
    pub fn report(&self, method: &str, path: &str, status: u16, message: &str) {
        let Some(endpoint) = self.endpoint.clone() else {
            return;
        };

        let payload = json!({
            "level": "error",
            "method": method,
            "path": path,
            "status": status,
            "message": message,
            "service": "taskboard-web",
            "version": env!("CARGO_PKG_VERSION"),
        });

        let client = self.client.clone();
        let token = self.token.clone();

        tokio::spawn(async move {
            let mut request = client.post(&endpoint).json(&payload);
            if let Some(token) = token {
                request = request.header("X-Access-Token", token);
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Error report delivered");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "Error report rejected");
                }
                Err(e) => {
                    warn!("Failed to deliver error report: {}", e);
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_disabled_reporter_is_a_noop() {
        let reporter = ErrorReporter::disabled();
        // Must not panic or spawn anything that outlives the call
        reporter.report("GET", "/tasks", 500, "boom");
    }

    #[test]
    fn test_reporter_without_endpoint_is_disabled() {
        let reporter = ErrorReporter::new(&ReportConfig::default());
        assert!(reporter.endpoint.is_none());
    }
}
