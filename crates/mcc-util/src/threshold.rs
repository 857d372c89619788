//! Two-level thresholding of intensity masks.

use burn::{
    config::Config,
    tensor::{backend::Backend, Tensor},
};
use image::GrayImage;

/// Binarization levels applied to both masks before counting.
#[derive(Config, Debug)]
pub struct BinarizeConfig {
    /// Intensities strictly greater than this value become foreground.
    #[config(default = 127)]
    pub threshold: u8,
    /// Value written for foreground pixels.
    #[config(default = 255)]
    pub foreground_value: u8,
    /// Value written for background pixels.
    #[config(default = 0)]
    pub background_value: u8,
}

impl BinarizeConfig {
    /// Map a single intensity to the foreground or background level.
    pub fn binarize_value(&self, value: u8) -> u8 {
        if value > self.threshold {
            self.foreground_value
        } else {
            self.background_value
        }
    }
}

/// Threshold an intensity tensor into a two-level mask.
pub fn binarize<B: Backend, const D: usize>(
    intensities: Tensor<B, D>,
    config: &BinarizeConfig,
) -> Tensor<B, D> {
    let foreground = intensities
        .clone()
        .greater_elem(f32::from(config.threshold));

    intensities
        .zeros_like()
        .add_scalar(f32::from(config.background_value))
        .mask_fill(foreground, f32::from(config.foreground_value))
}

/// Threshold a grayscale image in place.
pub fn binarize_image(image: &mut GrayImage, config: &BinarizeConfig) {
    for pixel in image.pixels_mut() {
        pixel.0[0] = config.binarize_value(pixel.0[0]);
    }
}
