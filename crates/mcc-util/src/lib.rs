//! Loading and binarization helpers for mask evaluation.
//!
//! Everything here is plumbing around the metric: decoding masks from disk,
//! turning them into `[height, width]` burn tensors and reducing intensities to
//! two levels with [`BinarizeConfig`].

pub mod mask;
pub mod threshold;

pub use mask::{
    gray_image_to_tensor, is_extension_supported, is_supported_image_format, load_mask,
    load_mask_tensor, ImageError, ImageResult, SUPPORTED_EXTENSIONS,
};
pub use threshold::{binarize, binarize_image, BinarizeConfig};
