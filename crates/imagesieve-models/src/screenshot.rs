//! Screenshot detector

use std::path::Path;

use image::DynamicImage;
use imagesieve_core::{ClassProbabilities, Result};

use crate::model::ImageModel;
use crate::session::LazySession;

const WEIGHTS_FILE: &str = "screenshot.onnx";
const CLASS_NAMES: [&str; 2] = ["not_screenshot", "screenshot"];
const INPUT_SIZE: (u32, u32) = (224, 224); // The network also accepts 320x320.

/// Detects whether an image is a screen capture rather than a photo.
#[derive(Debug)]
pub struct ScreenshotDetector {
    session: LazySession,
}

impl ScreenshotDetector {
    /// Create an unloaded detector reading weights from `storage_root`.
    pub fn new(storage_root: impl AsRef<Path>) -> Self {
        Self {
            session: LazySession::new(storage_root.as_ref().join(WEIGHTS_FILE)),
        }
    }
}

impl ImageModel for ScreenshotDetector {
    fn identifier(&self) -> &'static str {
        "screenshot"
    }

    fn input_image_size(&self) -> (u32, u32) {
        INPUT_SIZE
    }

    fn class_names(&self) -> [&'static str; 2] {
        CLASS_NAMES
    }

    fn load(&self) -> Result<()> {
        self.session.load()
    }

    fn is_loaded(&self) -> bool {
        self.session.is_loaded()
    }

    fn unload(&self) {
        self.session.unload()
    }

    fn predict_classes(&self, image: &DynamicImage, normalize: bool) -> Result<ClassProbabilities> {
        let scores = self.session.predict(image, INPUT_SIZE, normalize)?;
        Ok(ClassProbabilities::from_scores(CLASS_NAMES, scores))
    }
}
