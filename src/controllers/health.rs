use actix_web::{Responder, web};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use tracing::info;

use crate::models::{CheckResult, CheckStatus, overall_status};
use crate::state::AppState;

use super::{ordered_results, pretty_json};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: CheckStatus,
    pub timestamp: String,
    pub services: Vec<CheckResult>,
}

// Aggregate health of every monitored service
pub async fn health_check(data: web::Data<AppState>) -> impl Responder {
    info!("Health check requested");

    let services = ordered_results(&data.monitor).await;
    let response = HealthResponse {
        status: overall_status(&services),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        services,
    };

    pretty_json(&response)
}
