//! HTML status dashboard

use actix_web::{HttpResponse, Responder, http::header::ContentType, web};
use chrono::SecondsFormat;
use std::collections::HashMap;
use tracing::info;

use crate::config::DashboardConfig;
use crate::models::{CheckResult, ServiceSpec};
use crate::state::AppState;

const STYLE: &str = r#"
        body { font-family: Arial, sans-serif; margin: 0; padding: 20px; line-height: 1.6; }
        h1 { color: #333; }
        .services { margin-top: 20px; }
        .service { border: 1px solid #ddd; padding: 10px; margin-bottom: 10px; border-radius: 4px; }
        .service h3 { margin-top: 0; }
        .up { background-color: #d4edda; border-color: #c3e6cb; }
        .down { background-color: #f8d7da; border-color: #f5c6cb; }
        .unknown { background-color: #fff3cd; border-color: #ffeeba; }
        .status-indicator { display: inline-block; padding: 3px 8px; border-radius: 3px; margin-left: 10px; }
        .status-up { background-color: #28a745; color: white; }
        .status-down { background-color: #dc3545; color: white; }
        .status-unknown { background-color: #ffc107; color: black; }
"#;

// Dashboard page
pub async fn home(data: web::Data<AppState>) -> impl Responder {
    info!("Dashboard requested");

    let results = data.monitor.results().await;
    let page = render(&data.dashboard, data.monitor.services(), &results);

    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(page)
}

/// Render the dashboard with one card per configured service, in
/// configuration order.
pub fn render(
    dashboard: &DashboardConfig,
    services: &[ServiceSpec],
    results: &HashMap<String, CheckResult>,
) -> String {
    let title = escape_html(&dashboard.title);
    let refresh_secs = dashboard.refresh_interval().as_secs();

    let mut html = format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="utf-8">
    <title>{title}</title>
    <style>{STYLE}</style>
    <script>
        setTimeout(function() {{ window.location.reload(); }}, {refresh_secs} * 1000);
    </script>
</head>
<body>
    <h1>{title}</h1>
    <p>Monitoring {count} services. Dashboard refreshes every {refresh_secs} seconds.</p>
    <p><a href="/health">View health API response</a> | <a href="/api/services">JSON API</a></p>
    <div class="services">
        <h2>Service Status</h2>
"#,
        count = services.len(),
    );

    for service in services {
        render_card(&mut html, service, results.get(&service.name));
    }

    html.push_str("    </div>\n</body>\n</html>\n");
    html
}

fn render_card(html: &mut String, service: &ServiceSpec, result: Option<&CheckResult>) {
    let (status, last_checked, response_time, status_code, message) = match result {
        Some(r) => (
            r.status.as_str(),
            r.last_checked.to_rfc3339_opts(SecondsFormat::Secs, true),
            r.response_time_ms,
            r.status_code,
            escape_html(&r.message),
        ),
        None => ("unknown", "Never".to_string(), 0, 0, "Not checked yet".to_string()),
    };

    html.push_str(&format!(
        r#"        <div class="service {status}">
            <h3>{name} <span class="status-indicator status-{status}">{status}</span></h3>
            <p>URL: {url}</p>
            <p>Last Checked: {last_checked}</p>
            <p>Response Time: {response_time} ms</p>
            <p>Status Code: {status_code}</p>
            <p>Message: {message}</p>
        </div>
"#,
        name = escape_html(&service.name),
        url = escape_html(&service.url),
    ));
}

fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
