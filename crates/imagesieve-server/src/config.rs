//! Server configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding the model weights files
    #[serde(default = "default_model_dir")]
    pub model_dir: PathBuf,

    /// Model identifiers to warm up at startup
    #[serde(default)]
    pub warm_models: Vec<String>,

    /// Maximum accepted upload size in bytes
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &str, cli: &crate::Cli) -> anyhow::Result<Self> {
        // Load from file when present, defaults otherwise
        let mut config = if Path::new(config_path).exists() {
            let content = std::fs::read_to_string(config_path)?;
            serde_yaml::from_str(&content)?
        } else {
            Self::default()
        };

        // Apply CLI overrides
        if let Some(model_dir) = &cli.model_dir {
            config.model_dir = model_dir.clone();
        }

        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            model_dir: default_model_dir(),
            warm_models: Vec::new(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

fn default_model_dir() -> PathBuf {
    PathBuf::from("./resources")
}

fn default_max_upload_bytes() -> usize {
    16 * 1024 * 1024
}
