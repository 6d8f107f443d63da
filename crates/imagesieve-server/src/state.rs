//! Shared application state

use std::sync::Arc;

use imagesieve_models::ModelRegistry;
use metrics_exporter_prometheus::PrometheusHandle;

use crate::config::ServerConfig;

/// Cloneable handle to everything the request handlers need.
#[derive(Clone)]
pub struct AppState {
    /// The process-wide model registry
    pub registry: Arc<ModelRegistry>,

    /// Loaded server configuration
    pub config: Arc<ServerConfig>,

    /// Render handle for the Prometheus exporter
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    /// Build state from configuration, registering every supported model
    /// unloaded.
    pub fn new(config: ServerConfig, metrics_handle: PrometheusHandle) -> Self {
        let registry = Arc::new(ModelRegistry::with_default_models(&config.model_dir));
        Self {
            registry,
            config: Arc::new(config),
            metrics_handle,
        }
    }
}
