//! Configuration loading and validation

use crate::errors::{MonitorError, Result};
use crate::models::{MAX_CHECK_PERIOD, ServiceSpec};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Services to monitor, in dashboard order
    #[serde(default)]
    pub services: Vec<ServiceConfig>,

    /// Dashboard presentation settings
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

// Missing keys are zero-filled so validation reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServiceConfig {
    pub name: String,
    pub url: String,
    pub method: String,

    /// Seconds between checks
    pub interval: i64,

    /// Seconds before a check is abandoned
    pub timeout: i64,

    pub expected_status: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DashboardConfig {
    pub title: String,

    /// Seconds between dashboard page reloads
    pub refresh_interval: i64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: "Service Monitor".to_string(),
            refresh_interval: 30,
        }
    }
}

impl Config {
    /// Read, parse and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let data = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            MonitorError::Config(format!(
                "failed to read the config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        Self::from_json(&data)
    }

    /// Parse and validate configuration from a JSON document
    pub fn from_json(data: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(data)?;

        config.validate().map_err(MonitorError::Config)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.services.is_empty() {
            return Err("no services defined in the config".to_string());
        }

        let max_secs = MAX_CHECK_PERIOD.as_secs() as i64;
        let mut seen = HashSet::new();

        for (i, service) in self.services.iter().enumerate() {
            if service.name.is_empty() {
                return Err(format!("service #{} has no name", i + 1));
            }

            if let Err(e) = Url::parse(&service.url) {
                return Err(format!(
                    "service '{}' has an invalid URL: {}",
                    service.name, e
                ));
            }

            if service.method.trim().is_empty() {
                return Err(format!(
                    "service '{}' has no HTTP method defined",
                    service.name
                ));
            }

            if service.interval <= 0 || service.interval > max_secs {
                return Err(format!(
                    "service '{}' has an invalid interval: must be > 0 and <= {}",
                    service.name, max_secs
                ));
            }

            if service.timeout <= 0 || service.timeout > max_secs {
                return Err(format!(
                    "service '{}' has an invalid timeout: must be > 0 and <= {}",
                    service.name, max_secs
                ));
            }

            if !seen.insert(service.name.as_str()) {
                return Err(format!(
                    "service '{}' is defined more than once",
                    service.name
                ));
            }
        }

        if self.dashboard.refresh_interval <= 0 || self.dashboard.refresh_interval > max_secs {
            return Err(format!(
                "dashboard has an invalid refresh interval: must be > 0 and <= {}",
                max_secs
            ));
        }

        Ok(())
    }

    /// Engine-facing service descriptions, in configuration order
    pub fn service_specs(&self) -> Vec<ServiceSpec> {
        self.services.iter().map(ServiceConfig::to_spec).collect()
    }
}

impl ServiceConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(0) as u64)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout.max(0) as u64)
    }

    pub fn to_spec(&self) -> ServiceSpec {
        ServiceSpec {
            name: self.name.clone(),
            url: self.url.clone(),
            method: self.method.trim().to_string(),
            check_interval: self.check_interval(),
            timeout: self.timeout(),
            expected_status: self.expected_status,
        }
    }
}

impl DashboardConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval.max(0) as u64)
    }
}
