//! Imagesieve Bench
//!
//! Loads every registered model, runs one inference against a provided or
//! synthetic image, and reports per-model load and inference timings.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use image::{DynamicImage, RgbImage};
use imagesieve_models::{ImageModel, ModelRegistry};

#[derive(Parser, Debug)]
#[command(name = "imagesieve-bench")]
#[command(about = "Load and time every imagesieve model", long_about = None)]
struct Cli {
    /// Image to classify; a blank 512x512 RGB image when omitted
    image: Option<PathBuf>,

    /// Directory holding the model weights files
    #[arg(short, long, default_value = "./resources")]
    model_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().init();

    let cli = Cli::parse();

    let image = match &cli.image {
        Some(path) => image::open(path)?,
        None => DynamicImage::ImageRgb8(RgbImage::new(512, 512)),
    };

    let registry = ModelRegistry::with_default_models(&cli.model_dir);

    for identifier in registry.model_identifiers() {
        let model = registry.get(identifier)?;

        let start = Instant::now();
        if let Err(e) = model.load() {
            println!("{identifier}: load failed: {e}");
            continue;
        }
        let load_ms = start.elapsed().as_secs_f64() * 1000.0;

        let start = Instant::now();
        match model.predict_classes(&image, true) {
            Ok(preds) => {
                let inference_ms = start.elapsed().as_secs_f64() * 1000.0;
                let formatted: Vec<String> = preds
                    .iter()
                    .map(|(name, p)| format!("{name}={p:.4}"))
                    .collect();
                println!(
                    "{identifier}: load {load_ms:.1}ms, inference {inference_ms:.1}ms, {}",
                    formatted.join(" ")
                );
            }
            Err(e) => println!("{identifier}: inference failed: {e}"),
        }

        model.unload();
    }

    Ok(())
}
