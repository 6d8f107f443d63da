//! Mock model tests
//!
//! A configurable mock implementation of the ImageModel trait, used to
//! exercise lifecycle transitions, registry behavior, and the
//! at-most-once-load guarantee without real weights files.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use image::{DynamicImage, RgbImage};
use imagesieve_core::{ClassProbabilities, Error, Result};
use imagesieve_models::{ImageModel, ModelRegistry};
use parking_lot::Mutex;

/// A mock classifier with a slow, countable load routine.
#[derive(Debug)]
struct MockModel {
    identifier: &'static str,
    scores: [f32; 2],
    load_delay: Duration,
    loaded: Mutex<bool>,
    load_count: AtomicU32,
    predict_count: AtomicU32,
}

impl MockModel {
    fn new(identifier: &'static str) -> Self {
        Self {
            identifier,
            scores: [0.25, 0.75],
            load_delay: Duration::ZERO,
            loaded: Mutex::new(false),
            load_count: AtomicU32::new(0),
            predict_count: AtomicU32::new(0),
        }
    }

    fn with_load_delay(mut self, delay: Duration) -> Self {
        self.load_delay = delay;
        self
    }

    fn load_count(&self) -> u32 {
        self.load_count.load(Ordering::SeqCst)
    }

    fn predict_count(&self) -> u32 {
        self.predict_count.load(Ordering::SeqCst)
    }
}

impl ImageModel for MockModel {
    fn identifier(&self) -> &'static str {
        self.identifier
    }

    fn input_image_size(&self) -> (u32, u32) {
        (224, 224)
    }

    fn class_names(&self) -> [&'static str; 2] {
        ["negative", "positive"]
    }

    fn load(&self) -> Result<()> {
        // Same discipline as the real session: racing callers block on the
        // lock and find the state already initialized.
        let mut loaded = self.loaded.lock();
        if *loaded {
            return Ok(());
        }
        self.load_count.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.load_delay);
        *loaded = true;
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        *self.loaded.lock()
    }

    fn unload(&self) {
        *self.loaded.lock() = false;
    }

    fn predict_classes(&self, _image: &DynamicImage, normalize: bool) -> Result<ClassProbabilities> {
        if !self.is_loaded() {
            return Err(Error::inference("model is not loaded"));
        }
        self.predict_count.fetch_add(1, Ordering::SeqCst);
        let scores = if normalize {
            self.scores
        } else {
            [self.scores[0] * 10.0, self.scores[1] * 10.0]
        };
        Ok(ClassProbabilities::from_scores(self.class_names(), scores))
    }
}

fn blank_image() -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::new(64, 64))
}

#[test]
fn test_lifecycle_transitions() {
    let model = MockModel::new("mock");

    assert!(!model.is_loaded());
    model.load().unwrap();
    assert!(model.is_loaded());
    model.unload();
    assert!(!model.is_loaded());

    // Unloading an unloaded model does not fail.
    model.unload();
    assert!(!model.is_loaded());
}

#[test]
fn test_load_is_idempotent() {
    let model = MockModel::new("mock");
    model.load().unwrap();
    model.load().unwrap();
    model.load().unwrap();
    assert_eq!(model.load_count(), 1);
}

#[test]
fn test_ensure_loaded_loads_once() {
    let model = MockModel::new("mock");
    model.ensure_loaded().unwrap();
    model.ensure_loaded().unwrap();
    assert!(model.is_loaded());
    assert_eq!(model.load_count(), 1);
}

#[test]
fn test_predict_requires_load() {
    let model = MockModel::new("mock");
    let err = model.predict_classes(&blank_image(), true).unwrap_err();
    assert!(matches!(err, Error::Inference(_)));
    assert_eq!(model.predict_count(), 0);
}

#[test]
fn test_sequential_predictions_are_identical() {
    let model = MockModel::new("mock");
    model.load().unwrap();

    let first = model.predict_classes(&blank_image(), true).unwrap();
    let second = model.predict_classes(&blank_image(), true).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_registry_hands_out_registered_mocks() {
    let mut registry = ModelRegistry::new();
    registry.register(Arc::new(MockModel::new("mock")));

    let first = registry.get("mock").unwrap();
    let second = registry.get("mock").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert!(matches!(
        registry.get("other").unwrap_err(),
        Error::UnknownModel(_)
    ));
}

#[test]
fn test_concurrent_first_requests_load_exactly_once() {
    let mock = Arc::new(MockModel::new("mock").with_load_delay(Duration::from_millis(30)));
    let mut registry = ModelRegistry::new();
    registry.register(mock.clone());
    let registry = Arc::new(registry);

    thread::scope(|scope| {
        for _ in 0..8 {
            let registry = Arc::clone(&registry);
            scope.spawn(move || {
                let model = registry.get("mock").unwrap();
                model.ensure_loaded().unwrap();
                let preds = model.predict_classes(&blank_image(), true).unwrap();
                assert!((preds.total() - 1.0).abs() < 1e-6);
            });
        }
    });

    assert_eq!(mock.load_count(), 1);
    assert_eq!(mock.predict_count(), 8);
}
