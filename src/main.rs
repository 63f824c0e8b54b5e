//! Service Monitor Binary

use clap::{Parser, ValueEnum};
use service_monitor::{AppState, Config, Monitor, Result, ServerConfig, server};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormat {
    Json,
    Pretty,
}

#[derive(Debug, Parser)]
#[command(name = "service-monitor", version, about = "Lightweight HTTP uptime dashboard")]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, env = "MONITOR_CONFIG", default_value = "config.json")]
    config: PathBuf,

    /// Address to bind the dashboard server to
    #[arg(long, env = "MONITOR_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to bind the dashboard server to
    #[arg(short, long, env = "MONITOR_PORT", default_value_t = 8080)]
    port: u16,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, value_enum, default_value_t = LogFormat::Json)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.log_format);

    info!("Starting Service Monitor v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(cli).await {
        error!("Service monitor failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(&cli.config)?;
    info!(
        "Loaded configuration with {} services to monitor from {}",
        config.services.len(),
        cli.config.display()
    );

    let monitor = Arc::new(Monitor::new(config.service_specs())?);
    monitor.start().await;

    let server_config = ServerConfig {
        host: cli.host,
        port: cli.port,
        ..ServerConfig::default()
    };
    let state = AppState::new(Arc::clone(&monitor), config.dashboard.clone());

    let served = server::run(&server_config, state).await;

    monitor.stop().await;
    served
}

/// Initialize structured logging
fn initialize_tracing(log_level: &str, format: LogFormat) {
    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer.json())
            .init(),
        LogFormat::Pretty => tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init(),
    }
}
