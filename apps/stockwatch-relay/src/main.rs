//! StockWatch Relay Binary
//!
//! Starts the change-stream relay.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin stockwatch-relay
//! ```
//!
//! # Environment Variables
//!
//! ## Required
//! - `TABLE_NAME`: Table receiving delta upserts
//! - `STOCKWATCH_STORE_ENDPOINT`: Store endpoint (http backend only)
//! - `STOCKWATCH_BUS_ENDPOINT`: Event bus endpoint (http backend only)
//!
//! ## Optional
//! - `STOCKWATCH_BACKEND`: "memory" | "http" (default: memory)
//! - `STOCKWATCH_EVENT_SOURCE`: Event source (default: stockwatch)
//! - `STOCKWATCH_EVENT_BUS_NAME`: Target bus (default: the default bus)
//! - `STOCKWATCH_INTAKE_PORT`: Batch intake HTTP port (default: 8080)
//! - `STOCKWATCH_HEALTH_PORT`: Health check HTTP port (default: 8082)
//! - `OTEL_ENABLED`: Enable OpenTelemetry export (default: false)
//! - `OTEL_EXPORTER_OTLP_ENDPOINT`: OTLP endpoint (default: <http://localhost:4317>)
//! - `OTEL_SERVICE_NAME`: Service name (default: stockwatch-relay)
//! - `RUST_LOG`: Log level (default: info)

use std::sync::Arc;
use std::time::Duration;

use stockwatch_relay::application::ports::{DeltaStorePort, EventPublisherPort};
use stockwatch_relay::application::use_cases::DispatchEventsUseCase;
use stockwatch_relay::infrastructure::event_bus::{HttpEventBusPublisher, InMemoryEventBus};
use stockwatch_relay::infrastructure::health::{HealthServer, HealthServerState};
use stockwatch_relay::infrastructure::intake::{IntakeServer, IntakeState};
use stockwatch_relay::infrastructure::store::{HttpDeltaStore, InMemoryDeltaStore};
use stockwatch_relay::infrastructure::telemetry;
use stockwatch_relay::{AdapterSettings, RelayConfig, init_metrics};
use tokio::signal;
use tokio_util::sync::CancellationToken;

/// Graceful shutdown timeout.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    load_dotenv();

    // Initialize telemetry (OpenTelemetry + tracing)
    let _telemetry_guard = telemetry::init();

    tracing::info!("Starting StockWatch relay");

    let _metrics_handle = init_metrics();

    let config = RelayConfig::from_env()?;
    log_config(&config);

    match &config.adapters {
        AdapterSettings::Memory => {
            let store = Arc::new(InMemoryDeltaStore::new());
            let bus = Arc::new(InMemoryEventBus::new());
            serve(&config, store, bus).await;
        }
        AdapterSettings::Http(endpoints) => {
            let store = Arc::new(HttpDeltaStore::new(&endpoints.store, &config.table_name)?);
            let bus = Arc::new(HttpEventBusPublisher::new(&endpoints.bus)?);
            serve(&config, store, bus).await;
        }
    }

    tracing::info!("StockWatch relay stopped");
    Ok(())
}

/// Wire the dispatcher to its adapters and run the servers until shutdown.
async fn serve<S, P>(config: &RelayConfig, store: Arc<S>, bus: Arc<P>)
where
    S: DeltaStorePort + 'static,
    P: EventPublisherPort + 'static,
{
    let shutdown_token = CancellationToken::new();

    let dispatcher = Arc::new(DispatchEventsUseCase::new(
        store,
        bus,
        config.dispatch_settings(),
    ));

    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        config.backend().as_str(),
        dispatcher.stats(),
    ));
    let health_server = HealthServer::new(
        config.server.health_port,
        health_state,
        shutdown_token.clone(),
    );
    let intake_server = IntakeServer::new(
        config.server.intake_port,
        IntakeState::new(dispatcher),
        shutdown_token.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    let intake_cancel = shutdown_token.clone();
    let intake = tokio::spawn(async move {
        if let Err(e) = intake_server.run().await {
            tracing::error!(error = %e, "Intake server error");
            intake_cancel.cancel();
        }
    });

    tracing::info!("StockWatch relay ready");

    await_shutdown(shutdown_token).await;

    if tokio::time::timeout(SHUTDOWN_TIMEOUT, intake).await.is_err() {
        tracing::warn!("In-flight batches did not finish before the shutdown timeout");
    }
}

/// Load .env file from current or ancestor directories.
fn load_dotenv() {
    if dotenvy::dotenv().is_err() {
        load_dotenv_from_ancestors();
    }
}

/// Log the parsed configuration.
fn log_config(config: &RelayConfig) {
    tracing::info!(
        table = %config.table_name,
        backend = config.backend().as_str(),
        event_source = %config.publish.event_source,
        event_bus = config.publish.event_bus_name.as_deref().unwrap_or("default"),
        intake_port = config.server.intake_port,
        health_port = config.server.health_port,
        "Configuration loaded"
    );
    if let AdapterSettings::Http(endpoints) = &config.adapters {
        tracing::debug!(
            store_endpoint = %endpoints.store,
            bus_endpoint = %endpoints.bus,
            "Downstream endpoints"
        );
    }
}

/// Load .env file from any ancestor directory.
fn load_dotenv_from_ancestors() {
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

/// Wait for a shutdown signal (SIGTERM or SIGINT) or an internal cancellation.
#[allow(clippy::expect_used)]
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("signal handler installation is critical for graceful shutdown");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler installation is critical for graceful shutdown")
            .recv()
            .await;
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
        () = shutdown_token.cancelled() => {
            tracing::warn!("Intake stopped, initiating shutdown");
        }
    }

    shutdown_token.cancel();

    tracing::info!(
        timeout_secs = SHUTDOWN_TIMEOUT.as_secs(),
        "Graceful shutdown started"
    );
}
