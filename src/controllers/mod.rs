pub mod dashboard;
pub mod health;
pub mod services;

use actix_web::{HttpResponse, http::header::ContentType, web};
use serde::Serialize;
use tracing::error;

use crate::models::CheckResult;
use crate::monitor::Monitor;

/// Register all dashboard and API routes
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(dashboard::home))
        .route("/health", web::get().to(health::health_check))
        .route("/api/services", web::get().to(services::list_services))
        .route("/api/services/{name}", web::get().to(services::get_service));
}

// Latest results ordered like the configured services
pub(crate) async fn ordered_results(monitor: &Monitor) -> Vec<CheckResult> {
    let mut results = monitor.results_list().await;
    let position = |name: &str| {
        monitor
            .services()
            .iter()
            .position(|s| s.name == name)
            .unwrap_or(usize::MAX)
    };
    results.sort_by_key(|r| position(r.service_name.as_str()));
    results
}

// Pretty-printed JSON body, 500 if serialization fails
pub(crate) fn pretty_json<T: Serialize>(value: &T) -> HttpResponse {
    match serde_json::to_string_pretty(value) {
        Ok(body) => HttpResponse::Ok()
            .content_type(ContentType::json())
            .body(body),
        Err(e) => {
            error!("Failed to serialize response: {}", e);
            HttpResponse::InternalServerError().body("Internal Server Error")
        }
    }
}
