use std::sync::Arc;

use crate::config::DashboardConfig;
use crate::monitor::Monitor;

// App state shared with every request handler
#[derive(Clone)]
pub struct AppState {
    pub monitor: Arc<Monitor>,
    pub dashboard: DashboardConfig,
}

impl AppState {
    pub fn new(monitor: Arc<Monitor>, dashboard: DashboardConfig) -> Self {
        Self { monitor, dashboard }
    }
}
