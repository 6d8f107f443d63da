//! The polymorphic model contract

use image::DynamicImage;
use imagesieve_core::{ClassProbabilities, Result};

/// Contract every image classifier implements.
///
/// Implementations are `Send + Sync` value types held behind `Arc<dyn
/// ImageModel>` in the registry. Methods are synchronous: loading and
/// inference are disk/CPU bound, and callers on an async runtime bridge
/// with `spawn_blocking`.
pub trait ImageModel: Send + Sync + std::fmt::Debug {
    /// Registry identifier, unique within a running process.
    fn identifier(&self) -> &'static str;

    /// Expected (width, height) of model input. Queryable without loading.
    fn input_image_size(&self) -> (u32, u32);

    /// The two output class names, in output tensor index order.
    ///
    /// Index 0 maps to the first name, index 1 to the second; the order is
    /// model-specific, not a universal convention.
    fn class_names(&self) -> [&'static str; 2];

    /// Acquire the inference session, reading weights from disk.
    ///
    /// Idempotent: calling on an already-loaded model is a no-op, not a
    /// reload. This is the one operation expected to block noticeably.
    fn load(&self) -> Result<()>;

    /// Whether inference can be called right now without loading first.
    fn is_loaded(&self) -> bool;

    /// Release the held session. Safe to call when already unloaded.
    fn unload(&self);

    /// Classify an image into the model's two classes.
    ///
    /// When `normalize` is set, raw logits pass through softmax; otherwise
    /// raw outputs are returned as-is and interpretation is on the caller.
    /// Fails when the model is not loaded.
    fn predict_classes(&self, image: &DynamicImage, normalize: bool) -> Result<ClassProbabilities>;

    /// Load unless already loaded.
    fn ensure_loaded(&self) -> Result<()> {
        if !self.is_loaded() {
            self.load()?;
        }
        Ok(())
    }
}
