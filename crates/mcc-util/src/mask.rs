//! Mask decoding and image-to-tensor conversion.
//!
//! Masks are always read as single-channel 8-bit images. Colour inputs are
//! reduced to luma on load, so every mask reaches the metric code as a grid of
//! intensities in `0..=255`.

use std::path::Path;

use burn::tensor::{backend::Backend, Tensor, TensorData};
use image::GrayImage;
use thiserror::Error;

/// File extensions accepted when scanning directories for masks.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "bmp", "tif", "tiff"];

/// Errors raised while decoding masks.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("failed to open image at '{path}': {source}")]
    ImageLoadError {
        path: String,
        #[source]
        source: image::ImageError,
    },
}

/// Result type alias for ImageError
pub type ImageResult<T> = Result<T, ImageError>;

/// Load a mask from disk as an 8-bit grayscale image.
///
/// # Errors
///
/// Returns [`ImageError::ImageLoadError`] when the file cannot be read or is
/// not a decodable image.
pub fn load_mask<P: AsRef<Path>>(path: P) -> ImageResult<GrayImage> {
    let path_str = path.as_ref().display().to_string();
    let img = image::open(&path).map_err(|source| ImageError::ImageLoadError {
        path: path_str,
        source,
    })?;

    Ok(img.into_luma8())
}

/// Load a mask from disk straight into a `[height, width]` intensity tensor.
pub fn load_mask_tensor<B: Backend, P: AsRef<Path>>(
    path: P,
    device: &B::Device,
) -> ImageResult<Tensor<B, 2>> {
    let mask = load_mask(path)?;
    Ok(gray_image_to_tensor(&mask, device))
}

/// Convert a grayscale image to a `[height, width]` tensor of raw intensities.
///
/// Values are kept in `0..=255`; no normalisation is applied because the
/// threshold is expressed on that scale.
pub fn gray_image_to_tensor<B: Backend>(image: &GrayImage, device: &B::Device) -> Tensor<B, 2> {
    let (width, height) = image.dimensions();
    let values: Vec<f32> = image.as_raw().iter().map(|&v| f32::from(v)).collect();

    let data =
        TensorData::new(values, [height as usize, width as usize]).convert::<B::FloatElem>();
    Tensor::from_data(data, device)
}

/// Whether `extension` (with or without a leading dot) names a supported format.
pub fn is_extension_supported(extension: &str) -> bool {
    let extension = extension.trim_start_matches('.');
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|supported| supported.eq_ignore_ascii_case(extension))
}

/// Whether the file at `path` has a supported image extension.
pub fn is_supported_image_format<P: AsRef<Path>>(path: P) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(is_extension_supported)
}
