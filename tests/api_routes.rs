use actix_web::{App, test, web};
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use service_monitor::controllers::configure_routes;
use service_monitor::{
    AppState, CheckResult, CheckStatus, DashboardConfig, Monitor, Probe, ServiceSpec,
};
use std::sync::Arc;
use std::time::Duration;

/// Reports "db" as down with a 503 and everything else as up
struct FixedProbe;

#[async_trait]
impl Probe for FixedProbe {
    async fn probe(&self, spec: &ServiceSpec) -> CheckResult {
        let code = if spec.name == "db" { 503 } else { 200 };
        CheckResult::from_response(spec, Utc::now(), code, Duration::from_millis(7))
    }
}

fn monitor() -> Arc<Monitor> {
    Arc::new(Monitor::with_prober(
        vec![
            ServiceSpec::new("api", "http://api.internal/health"),
            ServiceSpec::new("db", "http://db.internal/ping"),
        ],
        Arc::new(FixedProbe),
    ))
}

async fn started_state() -> AppState {
    let monitor = monitor();
    monitor.start().await;

    for _ in 0..50 {
        let results = monitor.results_list().await;
        if results.iter().all(|r| r.status != CheckStatus::Unknown) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    AppState::new(monitor, DashboardConfig::default())
}

#[actix_web::test]
async fn health_reports_worst_status() {
    let state = started_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "down");
    assert!(body["timestamp"].is_string());
    assert_eq!(body["services"].as_array().unwrap().len(), 2);

    state.monitor.stop().await;
}

#[actix_web::test]
async fn services_listed_in_config_order() {
    let state = started_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/services").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let services = body.as_array().unwrap();

    assert_eq!(services[0]["serviceName"], "api");
    assert_eq!(services[0]["status"], "up");
    assert_eq!(services[0]["responseTimeMs"], 7);
    assert_eq!(services[1]["serviceName"], "db");
    assert_eq!(services[1]["statusCode"], 503);

    state.monitor.stop().await;
}

#[actix_web::test]
async fn single_service_lookup() {
    let state = started_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/services/db").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "down");
    assert!(body["message"].as_str().unwrap().contains("503"));

    let req = test::TestRequest::get().uri("/api/services/missing").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 404);

    state.monitor.stop().await;
}

#[actix_web::test]
async fn dashboard_renders_every_service() {
    let state = started_state().await;
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state.clone()))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;
    assert!(resp.status().is_success());

    let body = test::read_body(resp).await;
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("<title>Service Monitor</title>"));
    assert!(page.contains("http://api.internal/health"));
    assert!(page.contains(r#"class="service down""#));

    state.monitor.stop().await;
}

#[actix_web::test]
async fn empty_view_before_start() {
    let state = AppState::new(monitor(), DashboardConfig::default());
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(state))
            .configure(configure_routes),
    )
    .await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "up");
    assert!(body["services"].as_array().unwrap().is_empty());
}
