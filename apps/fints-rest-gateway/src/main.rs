//! FinTS REST Gateway Binary
//!
//! Starts the HTTP gateway.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin fints-rest-gateway
//! ```
//!
//! # Environment Variables
//!
//! ## Required (checked per request)
//! - `API_PASSWORD`: Bearer token callers must present
//! - `FINTS_BANK_URL`: Bank FinTS endpoint
//! - `FINTS_BANK_CODE`: Bank code (BLZ)
//! - `FINTS_USERNAME`: Online-banking login
//! - `FINTS_PIN`: Online-banking PIN
//!
//! ## Optional
//! - `HTTP_HOST`: Bind address (default: 0.0.0.0)
//! - `HTTP_PORT`: Gateway port (default: 8000)
//! - `GATEWAY_METRICS_PORT`: Prometheus exporter port (default: 0, disabled)
//! - `FINTS_SANDBOX_FIXTURE`: Serve the sandbox bank from this JSON fixture
//! - `FINTS_SANDBOX`: `demo` serves the sandbox bank with built-in demo data
//!
//! With neither sandbox variable set no bank connector is configured and every
//! inquiry fails with 500.
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: fints-rest-gateway)
//! - `RUST_LOG`: Log level (default: info)

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use chrono::Utc;
use fints_rest_gateway::infrastructure::telemetry;
use fints_rest_gateway::{
    AppState, BearerGate, ConfiguredBank, GatewayConfig, GatewayServer, SessionOrchestrator,
    create_router, init_metrics,
};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Time allowed for in-flight requests after a shutdown signal.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv_from_ancestors();

    let _telemetry_guard = telemetry::init().context("failed to initialize telemetry")?;

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        "Starting FinTS REST gateway"
    );

    let config = GatewayConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    if config.server.metrics_port != 0 {
        init_metrics(SocketAddr::new(config.server.host, config.server.metrics_port))
            .context("failed to start Prometheus exporter")?;
    }

    let bank = ConfiguredBank::from_source(config.sandbox.as_ref(), Utc::now().date_naive())
        .context("failed to load sandbox fixture")?;
    tracing::info!(connector = bank.describe(), "Bank connector selected");
    if matches!(bank, ConfiguredBank::Unconfigured) {
        tracing::warn!("No bank connector configured, inquiries will fail with 500");
    }

    let orchestrator = SessionOrchestrator::new(Arc::new(bank));
    let state = AppState::new(orchestrator, config.credential_provider());
    let router = create_router(state, BearerGate::new(config.api_password.clone()));

    let shutdown_token = CancellationToken::new();
    let addr = SocketAddr::new(config.server.host, config.server.http_port);
    let server = GatewayServer::bind(addr, router, shutdown_token.clone()).await?;
    let mut server_task = tokio::spawn(server.run());

    tokio::select! {
        result = &mut server_task => {
            result??;
            return Ok(());
        }
        () = await_shutdown(shutdown_token) => {}
    }

    match tokio::time::timeout(SHUTDOWN_TIMEOUT, server_task).await {
        Ok(result) => result??,
        Err(_) => tracing::warn!(
            timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
            "Shutdown timeout elapsed, abandoning in-flight requests"
        ),
    }

    tracing::info!("FinTS REST gateway stopped");
    Ok(())
}

/// Log the parsed configuration. Secrets are reported as present or absent.
fn log_config(config: &GatewayConfig) {
    tracing::info!(
        host = %config.server.host,
        http_port = config.server.http_port,
        metrics_port = config.server.metrics_port,
        sandbox = ?config.sandbox,
        "Configuration loaded"
    );

    if config.api_password.is_none() {
        tracing::warn!("API_PASSWORD not set, every request will fail with 500");
    }
    if !config.credential_provider().is_complete() {
        tracing::warn!("FinTS configuration incomplete, inquiries will fail with 500");
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv_from_ancestors() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for shutdown signal (SIGTERM or SIGINT), then cancel the token.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
