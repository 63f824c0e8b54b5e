//! Single bounded-time HTTP probes

use crate::errors::{MonitorError, Result};
use crate::models::{CheckResult, ServiceSpec};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Method, Url, redirect};
use std::time::Instant;
use tokio::time::timeout;
use tracing::debug;

/// Maximum redirects followed before a probe is reported as failed
pub const MAX_REDIRECTS: usize = 10;

/// Executes one check against a service.
///
/// Implementations never fail: every error is folded into the returned
/// [`CheckResult`].
#[async_trait]
pub trait Probe: Send + Sync {
    async fn probe(&self, spec: &ServiceSpec) -> CheckResult;
}

/// HTTP prober sharing one connection pool across all services
#[derive(Debug, Clone)]
pub struct HttpProber {
    client: Client,
}

impl HttpProber {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .redirect(redirect::Policy::limited(MAX_REDIRECTS))
            .user_agent(format!("service-monitor/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(MonitorError::Http)?;

        Ok(Self { client })
    }

    fn build_request(&self, spec: &ServiceSpec) -> std::result::Result<reqwest::Request, String> {
        let method = Method::from_bytes(spec.method.as_bytes())
            .map_err(|e| format!("invalid method '{}': {}", spec.method, e))?;
        let url = Url::parse(&spec.url).map_err(|e| format!("invalid URL '{}': {}", spec.url, e))?;

        self.client
            .request(method, url)
            .build()
            .map_err(|e| e.to_string())
    }
}

#[async_trait]
impl Probe for HttpProber {
    async fn probe(&self, spec: &ServiceSpec) -> CheckResult {
        let checked_at = Utc::now();

        let request = match self.build_request(spec) {
            Ok(request) => request,
            Err(e) => {
                debug!("Could not build request for {}: {}", spec.name, e);
                return CheckResult::down(
                    spec,
                    checked_at,
                    format!("failed to create request: {}", e),
                );
            }
        };

        let start = Instant::now();
        let outcome = timeout(spec.timeout, self.client.execute(request)).await;
        let elapsed = start.elapsed();

        match outcome {
            Ok(Ok(response)) => {
                let status = response.status().as_u16();
                // Dropping the response releases the connection without reading the body.
                drop(response);

                debug!(
                    "Probe of {} returned {} in {}ms",
                    spec.name,
                    status,
                    elapsed.as_millis()
                );
                CheckResult::from_response(spec, checked_at, status, elapsed)
            }
            Ok(Err(e)) => {
                debug!("Probe of {} failed: {}", spec.name, e);
                CheckResult::down(spec, checked_at, format!("request failed: {}", e))
                    .with_response_time(elapsed)
            }
            Err(_) => {
                debug!("Probe of {} timed out after {:?}", spec.name, spec.timeout);
                CheckResult::down(
                    spec,
                    checked_at,
                    format!("request failed: timed out after {:?}", spec.timeout),
                )
                .with_response_time(elapsed)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CheckStatus;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_expected_status_is_up() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/health"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let spec = ServiceSpec::new("api", format!("{}/health", server.uri()));
        let result = prober.probe(&spec).await;

        assert_eq!(result.status, CheckStatus::Up);
        assert_eq!(result.status_code, 200);
        assert_eq!(result.service_name, "api");
    }

    #[tokio::test]
    async fn test_configured_method_is_used() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let spec = ServiceSpec::new("api", server.uri())
            .with_method("HEAD")
            .with_expected_status(204);

        assert!(prober.probe(&spec).await.is_up());
    }

    #[tokio::test]
    async fn test_unexpected_status_names_code() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let result = prober.probe(&ServiceSpec::new("api", server.uri())).await;

        assert_eq!(result.status, CheckStatus::Down);
        assert_eq!(result.status_code, 404);
        assert!(result.message.contains("404"));
    }

    #[tokio::test]
    async fn test_timeout_is_down_with_zero_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let prober = HttpProber::new().unwrap();
        let spec =
            ServiceSpec::new("slow", server.uri()).with_timeout(Duration::from_millis(200));

        let started = Instant::now();
        let result = prober.probe(&spec).await;

        assert!(started.elapsed() < Duration::from_secs(2));
        assert_eq!(result.status, CheckStatus::Down);
        assert_eq!(result.status_code, 0);
        assert!(result.message.contains("timed out"));
        assert!(result.response_time_ms >= 200);
    }

    #[tokio::test]
    async fn test_invalid_method_fails_construction() {
        let prober = HttpProber::new().unwrap();
        let spec = ServiceSpec::new("api", "http://127.0.0.1:1/").with_method("BAD METHOD");
        let result = prober.probe(&spec).await;

        assert_eq!(result.status, CheckStatus::Down);
        assert_eq!(result.response_time_ms, 0);
        assert_eq!(result.status_code, 0);
        assert!(result.message.starts_with("failed to create request"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_down() {
        let prober = HttpProber::new().unwrap();
        let spec = ServiceSpec::new("gone", "http://127.0.0.1:1/")
            .with_timeout(Duration::from_secs(2));
        let result = prober.probe(&spec).await;

        assert_eq!(result.status, CheckStatus::Down);
        assert_eq!(result.status_code, 0);
        assert!(result.message.starts_with("request failed"));
    }
}
