//! HTTP server exposing the dashboard and JSON API

use actix_web::{App, HttpServer, middleware, web};
use std::time::Duration;
use tracing::info;

use crate::controllers;
use crate::errors::{MonitorError, Result};
use crate::state::AppState;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout: Duration,
    pub keep_alive: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout: Duration::from_secs(10),
            keep_alive: Duration::from_secs(120),
        }
    }
}

/// Serve until the process receives a shutdown signal
pub async fn run(config: &ServerConfig, state: AppState) -> Result<()> {
    let data = web::Data::new(state);

    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(middleware::Logger::default())
            .configure(controllers::configure_routes)
    })
    .client_request_timeout(config.request_timeout)
    .keep_alive(config.keep_alive)
    .bind((config.host.as_str(), config.port))
    .map_err(|e| {
        MonitorError::Server(format!(
            "failed to bind {}:{}: {}",
            config.host, config.port, e
        ))
    })?;

    info!("Server listening on http://{}:{}", config.host, config.port);

    server.run().await?;

    info!("Server stopped");
    Ok(())
}
