//! Model registry initialization and lookup

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use imagesieve_core::{Error, Result};
use tracing::info;

use crate::adult_content::AdultContentDetector;
use crate::bad_crop::BadCropDetector;
use crate::model::ImageModel;
use crate::screenshot::ScreenshotDetector;

/// Process-wide mapping from model identifier to model instance.
///
/// Built once at startup with every supported model registered unloaded;
/// the key set stays constant for the process lifetime. The registry never
/// loads on its own — callers check `is_loaded` and drive `ensure_loaded`,
/// so the first request for a model pays the load latency and later
/// requests reuse the session.
pub struct ModelRegistry {
    models: HashMap<&'static str, Arc<dyn ImageModel>>,
    order: Vec<&'static str>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            models: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a registry holding every supported classifier, unloaded,
    /// with weights files resolved under `storage_root`.
    pub fn with_default_models(storage_root: impl AsRef<Path>) -> Self {
        let root = storage_root.as_ref();
        let mut registry = Self::new();
        registry.register(Arc::new(AdultContentDetector::new(root)));
        registry.register(Arc::new(ScreenshotDetector::new(root)));
        registry.register(Arc::new(BadCropDetector::new(root)));
        info!(
            models = registry.len(),
            storage_root = %root.display(),
            "model registry initialized"
        );
        registry
    }

    /// Register a model under its own identifier.
    pub fn register(&mut self, model: Arc<dyn ImageModel>) {
        let identifier = model.identifier();
        if self.models.insert(identifier, model).is_none() {
            self.order.push(identifier);
        }
    }

    /// Look up a model by identifier.
    ///
    /// The same `Arc` is handed out on every call; an unknown identifier is
    /// a client error, not a fatal one.
    pub fn get(&self, identifier: &str) -> Result<Arc<dyn ImageModel>> {
        self.models
            .get(identifier)
            .cloned()
            .ok_or_else(|| Error::unknown_model(identifier))
    }

    /// Model identifiers in registration order.
    pub fn model_identifiers(&self) -> Vec<&'static str> {
        self.order.clone()
    }

    /// Number of registered models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether no models are registered.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
