//! Service and check result data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message stored for every service before its first probe completes
pub const NOT_STARTED_MESSAGE: &str = "monitoring not started";

/// Message stored when a probe observes the expected status code
pub const HEALTHY_MESSAGE: &str = "service is healthy";

/// Longest accepted check interval, check timeout or dashboard refresh
pub const MAX_CHECK_PERIOD: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Immutable description of one endpoint to probe.
///
/// Built once from the loaded configuration and shared by the monitor for
/// its whole lifetime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceSpec {
    pub name: String,
    pub url: String,
    pub method: String,
    pub check_interval: Duration,
    pub timeout: Duration,
    pub expected_status: u16,
}

impl ServiceSpec {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            method: "GET".to_string(),
            check_interval: Duration::from_secs(30),
            timeout: Duration::from_secs(5),
            expected_status: 200,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    pub fn with_interval(mut self, check_interval: Duration) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_expected_status(mut self, expected_status: u16) -> Self {
        self.expected_status = expected_status;
        self
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Unknown,
    Up,
    Down,
}

impl CheckStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Unknown => "unknown",
            CheckStatus::Up => "up",
            CheckStatus::Down => "down",
        }
    }
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Latest known outcome of probing a service.
///
/// Every probe produces a whole new value; results are replaced, never merged.
/// `response_time_ms` and `status_code` are zero when no request attempt was
/// made or no response arrived.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CheckResult {
    pub service_name: String,
    pub url: String,
    pub status: CheckStatus,
    pub response_time_ms: u64,
    pub status_code: u16,
    pub message: String,
    pub last_checked: DateTime<Utc>,
}

impl CheckResult {
    /// Placeholder stored for a service before its first probe
    pub fn pending(spec: &ServiceSpec) -> Self {
        Self {
            service_name: spec.name.clone(),
            url: spec.url.clone(),
            status: CheckStatus::Unknown,
            response_time_ms: 0,
            status_code: 0,
            message: NOT_STARTED_MESSAGE.to_string(),
            last_checked: Utc::now(),
        }
    }

    /// Result for a probe that failed before or without a response
    pub fn down(spec: &ServiceSpec, checked_at: DateTime<Utc>, message: String) -> Self {
        Self {
            service_name: spec.name.clone(),
            url: spec.url.clone(),
            status: CheckStatus::Down,
            response_time_ms: 0,
            status_code: 0,
            message,
            last_checked: checked_at,
        }
    }

    pub fn with_response_time(mut self, elapsed: Duration) -> Self {
        self.response_time_ms = elapsed.as_millis() as u64;
        self
    }

    /// Result for a probe that received a response with `status_code`
    pub fn from_response(
        spec: &ServiceSpec,
        checked_at: DateTime<Utc>,
        status_code: u16,
        elapsed: Duration,
    ) -> Self {
        let (status, message) = if status_code == spec.expected_status {
            (CheckStatus::Up, HEALTHY_MESSAGE.to_string())
        } else {
            (
                CheckStatus::Down,
                format!("unexpected status code: {}", status_code),
            )
        };

        Self {
            service_name: spec.name.clone(),
            url: spec.url.clone(),
            status,
            response_time_ms: elapsed.as_millis() as u64,
            status_code,
            message,
            last_checked: checked_at,
        }
    }

    pub fn is_up(&self) -> bool {
        self.status == CheckStatus::Up
    }
}

/// Aggregate status over a set of results.
///
/// Any `down` wins, otherwise any `unknown`, otherwise `up`. An empty set is
/// reported as `up`.
pub fn overall_status<'a, I>(results: I) -> CheckStatus
where
    I: IntoIterator<Item = &'a CheckResult>,
{
    let mut overall = CheckStatus::Up;
    for result in results {
        match result.status {
            CheckStatus::Down => return CheckStatus::Down,
            CheckStatus::Unknown => overall = CheckStatus::Unknown,
            CheckStatus::Up => {}
        }
    }
    overall
}
