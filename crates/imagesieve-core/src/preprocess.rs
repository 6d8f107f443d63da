//! Image preprocessing into model-ready tensors

use image::{imageops::FilterType, ColorType, DynamicImage, GenericImageView};
use ndarray::Array3;
use tracing::trace;

use crate::error::{Error, Result};

/// Convert an image into a `(channel, height, width)` float tensor.
///
/// The classification networks take three-channel input with pixel
/// intensities scaled from `0..=255` into `[0.0, 1.0]`. Decoded images come
/// out in height/width/channel order, so the axes are transposed on the way
/// through.
///
/// With `auto_resize` set, the image is resized to `target_size` and
/// converted to RGB regardless of its decoded form. Without it, the image
/// must already be exactly `target_size` and already RGB; anything else is a
/// caller-contract violation and fails with [`Error::Preprocess`] rather
/// than being coerced.
pub fn to_chw_tensor(
    image: &DynamicImage,
    target_size: (u32, u32),
    auto_resize: bool,
) -> Result<Array3<f32>> {
    let (target_width, target_height) = target_size;

    if !auto_resize {
        let (width, height) = image.dimensions();
        if (width, height) != target_size {
            return Err(Error::preprocess(format!(
                "expected a {}x{} image, got {}x{}",
                target_width, target_height, width, height
            )));
        }
        if image.color() != ColorType::Rgb8 {
            return Err(Error::preprocess(format!(
                "expected an RGB image, got {:?}",
                image.color()
            )));
        }
    }

    let rgb = if auto_resize {
        trace!(
            from = ?image.dimensions(),
            to = ?target_size,
            "resizing image for inference"
        );
        image
            .resize_exact(target_width, target_height, FilterType::Triangle)
            .to_rgb8()
    } else {
        image.to_rgb8()
    };

    let tensor = Array3::from_shape_fn(
        (3, target_height as usize, target_width as usize),
        |(c, y, x)| rgb.get_pixel(x as u32, y as u32)[c] as f32 / 255.0,
    );

    Ok(tensor)
}
