use actix_web::{HttpResponse, Responder, web};
use serde_json::json;
use tracing::info;

use crate::state::AppState;

use super::{ordered_results, pretty_json};

// List the latest result of every service
pub async fn list_services(data: web::Data<AppState>) -> impl Responder {
    info!("Request for all service results");
    let results = ordered_results(&data.monitor).await;
    info!("Returning results for {} services", results.len());

    pretty_json(&results)
}

// Latest result of a single service
pub async fn get_service(
    data: web::Data<AppState>,
    service_name: web::Path<String>,
) -> HttpResponse {
    let name = service_name.into_inner();
    info!("Request for result of service: {}", name);

    match data.monitor.result(&name).await {
        Some(result) => pretty_json(&result),
        None => HttpResponse::NotFound().json(json!({
            "error": format!("service '{}' is not monitored", name)
        })),
    }
}
