//! Lazy ONNX session management shared by the concrete classifiers

use std::path::{Path, PathBuf};

use image::DynamicImage;
use ndarray::{Array4, Axis};
use ort::session::{builder::GraphOptimizationLevel, Session};
use ort::value::Value;
use parking_lot::Mutex;
use tracing::{debug, info};

use imagesieve_core::{softmax, to_chw_tensor, Error, Result};

/// Input tensor name the classification networks expose.
const INPUT_NAME: &str = "input";
/// Output tensor name the classification networks expose.
const OUTPUT_NAME: &str = "output";

/// A lazily-initialized ONNX session tied to one weights file.
///
/// A single mutex guards both lifecycle and inference: concurrent first
/// callers racing to load block on the lock and find the session already
/// initialized (at most one load per instance), and runs are serialized
/// because the session is not assumed safe for concurrent invocation.
#[derive(Debug)]
pub struct LazySession {
    weights_path: PathBuf,
    session: Mutex<Option<Session>>,
}

impl LazySession {
    /// Create an unloaded session for the given weights file.
    pub fn new(weights_path: impl Into<PathBuf>) -> Self {
        Self {
            weights_path: weights_path.into(),
            session: Mutex::new(None),
        }
    }

    /// Path of the weights file this session loads from.
    pub fn weights_path(&self) -> &Path {
        &self.weights_path
    }

    /// Initialize the session from the weights file.
    ///
    /// A no-op when already loaded. Blocks on disk I/O and graph
    /// optimization.
    pub fn load(&self) -> Result<()> {
        let mut guard = self.session.lock();
        if guard.is_some() {
            return Ok(());
        }

        if !self.weights_path.exists() {
            return Err(Error::load(format!(
                "model weights not found: {}",
                self.weights_path.display()
            )));
        }

        info!(path = %self.weights_path.display(), "loading onnx session");
        let session = Session::builder()
            .map_err(|e| Error::load(format!("failed to create session builder: {e}")))?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .map_err(|e| Error::load(format!("failed to set optimization level: {e}")))?
            .with_intra_threads(num_cpus::get())
            .map_err(|e| Error::load(format!("failed to set intra-op threads: {e}")))?
            .commit_from_file(&self.weights_path)
            .map_err(|e| {
                Error::load(format!(
                    "failed to load {}: {e}",
                    self.weights_path.display()
                ))
            })?;

        *guard = Some(session);
        Ok(())
    }

    /// Whether a session is currently held.
    pub fn is_loaded(&self) -> bool {
        self.session.lock().is_some()
    }

    /// Drop the held session, if any.
    pub fn unload(&self) {
        let mut guard = self.session.lock();
        if guard.take().is_some() {
            debug!(path = %self.weights_path.display(), "onnx session unloaded");
        }
    }

    /// Preprocess an image at `input_size`, run a batch-of-one inference,
    /// and return the two scores of the only batch entry.
    pub fn predict(
        &self,
        image: &DynamicImage,
        input_size: (u32, u32),
        normalize: bool,
    ) -> Result<[f32; 2]> {
        let tensor = to_chw_tensor(image, input_size, true)?;
        let batched: Array4<f32> = tensor.insert_axis(Axis(0));
        let raw = self.run(batched)?;

        if raw.len() < 2 {
            return Err(Error::inference(format!(
                "expected two output scores, got {}",
                raw.len()
            )));
        }

        if normalize {
            let probs = softmax(&raw[..2]);
            Ok([probs[0], probs[1]])
        } else {
            Ok([raw[0], raw[1]])
        }
    }

    fn run(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let mut guard = self.session.lock();
        let session = guard
            .as_mut()
            .ok_or_else(|| Error::inference("model is not loaded"))?;

        let value = Value::from_array(input)
            .map_err(|e| Error::inference(format!("failed to build input tensor: {e}")))?;

        let outputs = session
            .run(ort::inputs![INPUT_NAME => value])
            .map_err(|e| Error::inference(format!("session run failed: {e}")))?;

        let output = outputs
            .get(OUTPUT_NAME)
            .ok_or_else(|| Error::inference(format!("model exposes no '{OUTPUT_NAME}' tensor")))?;

        let (_shape, data) = output
            .try_extract_tensor::<f32>()
            .map_err(|e| Error::inference(format!("failed to read output tensor: {e}")))?;

        Ok(data.to_vec())
    }
}
