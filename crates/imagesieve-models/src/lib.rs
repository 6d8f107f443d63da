//! Imagesieve Models
//!
//! ONNX-backed binary image classifiers behind one polymorphic contract,
//! plus the process-wide registry that owns them.
//!
//! Every classifier is registered unloaded and initializes its inference
//! session lazily on first use. Per instance, a single lock guarantees at
//! most one concurrent load and serializes inference runs.

pub mod adult_content;
pub mod bad_crop;
pub mod model;
pub mod registry;
pub mod screenshot;
pub mod session;

pub use adult_content::AdultContentDetector;
pub use bad_crop::BadCropDetector;
pub use model::ImageModel;
pub use registry::ModelRegistry;
pub use screenshot::ScreenshotDetector;
pub use session::LazySession;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::adult_content::AdultContentDetector;
    pub use crate::bad_crop::BadCropDetector;
    pub use crate::model::ImageModel;
    pub use crate::registry::ModelRegistry;
    pub use crate::screenshot::ScreenshotDetector;
}
