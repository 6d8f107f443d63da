//! Error types for imagesieve

/// Result type alias using imagesieve's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for imagesieve operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup of a model identifier not present in the registry
    #[error("unknown model: {0}")]
    UnknownModel(String),

    /// Weights file or session initialization failures
    #[error("model load error: {0}")]
    Load(String),

    /// Image shape/mode mismatches and undecodable inputs
    #[error("preprocess error: {0}")]
    Preprocess(String),

    /// The underlying inference session failed during a run
    #[error("inference error: {0}")]
    Inference(String),
}

impl Error {
    /// Create a new unknown-model error
    pub fn unknown_model(identifier: impl Into<String>) -> Self {
        Self::UnknownModel(identifier.into())
    }

    /// Create a new load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a new preprocess error
    pub fn preprocess(msg: impl Into<String>) -> Self {
        Self::Preprocess(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }
}
