//! Imagesieve Server
//!
//! HTTP front end for the imagesieve image classifiers. Accepts image
//! uploads, dispatches them to lazily-loaded ONNX models, and returns
//! class probabilities.

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusHandle;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::signal;
use tracing::{info, warn};

mod config;
mod routes;
mod state;

use config::ServerConfig;
use state::AppState;

#[derive(Parser, Debug)]
#[command(name = "imagesieve-server")]
#[command(about = "Imagesieve image classification service", long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,

    /// Directory holding the model weights files
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Listen address
    #[arg(short = 'l', long, default_value = "0.0.0.0")]
    listen: String,

    /// Listen port
    #[arg(short = 'P', long, default_value = "8080")]
    port: u16,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    info!("Starting imagesieve server");

    // Load configuration
    let config = ServerConfig::load(&cli.config, &cli)?;
    info!("Model storage root: {}", config.model_dir.display());

    // Initialize metrics
    let metrics_handle = init_metrics()?;

    // Initialize application state (registers every model, unloaded)
    let state = AppState::new(config, metrics_handle);

    // Warm up configured models; one model's failure leaves the others usable
    for name in &state.config.warm_models {
        match state.registry.get(name) {
            Ok(model) => match model.ensure_loaded() {
                Ok(()) => info!("Warmed up model: {}", name),
                Err(e) => warn!("Failed to warm up model {}: {}", name, e),
            },
            Err(e) => warn!("Unknown model in warm_models: {}", e),
        }
    }

    // Build and run the server with graceful shutdown
    let addr: SocketAddr = format!("{}:{}", cli.listen, cli.port).parse()?;
    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Listen for shutdown signals (SIGTERM, SIGINT)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    warn!("Shutdown signal received, stopping server...");
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("imagesieve=debug,tower_http=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("imagesieve=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let builder = PrometheusBuilder::new();
    let handle = builder
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "imagesieve_requests_total",
        "Total number of inference requests received"
    );
    metrics::describe_histogram!(
        "imagesieve_inference_latency_us",
        metrics::Unit::Microseconds,
        "Model load plus inference latency in microseconds"
    );
    metrics::describe_counter!(
        "imagesieve_errors_total",
        "Total number of failed requests"
    );

    Ok(handle)
}
