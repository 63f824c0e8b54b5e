//! Service Monitor Library
//!
//! This library periodically probes configured HTTP endpoints, keeps the
//! latest health status of each, and serves it as an HTML dashboard and a
//! JSON API.

pub mod config;
pub mod controllers;
pub mod errors;
pub mod models;
pub mod monitor;
pub mod prober;
pub mod server;
pub mod state;
pub mod store;

pub use config::{Config, DashboardConfig, ServiceConfig};
pub use errors::{MonitorError, Result};
pub use models::{CheckResult, CheckStatus, ServiceSpec};
pub use monitor::{Monitor, MonitorState};
pub use prober::{HttpProber, Probe};
pub use server::ServerConfig;
pub use state::AppState;
pub use store::ResultStore;
