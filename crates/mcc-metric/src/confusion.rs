//! Confusion-matrix counting for pairs of binarized masks.
//!
//! Counting follows the product encoding: every predicted pixel that is not
//! at the foreground level is re-encoded as [`PREDICTED_BACKGROUND_CODE`],
//! every such reference pixel as [`REFERENCE_BACKGROUND_CODE`], both masks are
//! multiplied element-wise and every product value identifies one of the four
//! outcomes. With the default levels the table is:
//!
//! | product | predicted  | reference  | outcome |
//! |---------|------------|------------|---------|
//! | 65025   | foreground | foreground | TP      |
//! | 510     | foreground | background | FN      |
//! | 255     | background | foreground | FP      |
//! | 2       | background | background | TN      |
//!
//! FP and FN are therefore named from the reference mask's point of view, and
//! [`ConfusionCounts::from_binary_images`] applies the same labelling.

use core::{
    fmt,
    ops::{Add, AddAssign},
};

use burn::tensor::{backend::Backend, ElementConversion, Tensor};
use image::GrayImage;
use mcc_util::BinarizeConfig;
use serde::Serialize;

use crate::error::{MetricError, MetricResult};

/// Code substituted for background pixels of the predicted mask.
pub const PREDICTED_BACKGROUND_CODE: u8 = 1;
/// Code substituted for background pixels of the reference mask.
pub const REFERENCE_BACKGROUND_CODE: u8 = 2;

/// Width and height of a mask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MaskShape {
    pub width: usize,
    pub height: usize,
}

impl MaskShape {
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Shape of a `[height, width]` tensor.
    pub fn of<B: Backend>(tensor: &Tensor<B, 2>) -> Self {
        let [height, width] = tensor.dims();
        Self { width, height }
    }

    /// Shape of a grayscale image.
    pub fn of_image(image: &GrayImage) -> Self {
        let (width, height) = image.dimensions();
        Self::new(width as usize, height as usize)
    }

    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }
}

impl fmt::Display for MaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Fails with [`MetricError::DimensionMismatch`] unless both shapes agree.
pub fn ensure_same_shape(predicted: MaskShape, reference: MaskShape) -> MetricResult<MaskShape> {
    if predicted != reference {
        return Err(MetricError::DimensionMismatch {
            predicted,
            reference,
        });
    }
    Ok(predicted)
}

/// Pixel counts for the four outcomes of comparing two binary masks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConfusionCounts {
    pub true_positives: u64,
    pub true_negatives: u64,
    pub false_positives: u64,
    pub false_negatives: u64,
}

impl ConfusionCounts {
    pub const fn new(
        true_positives: u64,
        true_negatives: u64,
        false_positives: u64,
        false_negatives: u64,
    ) -> Self {
        Self {
            true_positives,
            true_negatives,
            false_positives,
            false_negatives,
        }
    }

    /// Number of classified pixels.
    pub const fn total(&self) -> u64 {
        self.true_positives + self.true_negatives + self.false_positives + self.false_negatives
    }

    /// Matthews correlation coefficient of these counts.
    pub fn matthews_correlation(&self) -> f64 {
        crate::mcc::matthews_correlation(self)
    }

    /// Count outcomes with a direct per-pixel classification.
    ///
    /// Both images must already be binarized with `config`; a pixel equal to
    /// `config.foreground_value` is foreground, anything else background. The
    /// labelling is identical to the product encoding used by
    /// [`confusion_counts`].
    pub fn from_binary_images(
        predicted: &GrayImage,
        reference: &GrayImage,
        config: &BinarizeConfig,
    ) -> MetricResult<Self> {
        ProductCodes::new(config)?;
        ensure_same_shape(MaskShape::of_image(predicted), MaskShape::of_image(reference))?;

        let foreground = config.foreground_value;
        let mut counts = Self::default();
        for (&p, &r) in predicted.as_raw().iter().zip(reference.as_raw()) {
            match (p == foreground, r == foreground) {
                (true, true) => counts.true_positives += 1,
                (true, false) => counts.false_negatives += 1,
                (false, true) => counts.false_positives += 1,
                (false, false) => counts.true_negatives += 1,
            }
        }
        Ok(counts)
    }
}

impl Add for ConfusionCounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            true_positives: self.true_positives + rhs.true_positives,
            true_negatives: self.true_negatives + rhs.true_negatives,
            false_positives: self.false_positives + rhs.false_positives,
            false_negatives: self.false_negatives + rhs.false_negatives,
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// Product values that identify each outcome for a given binarization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductCodes {
    pub true_positive: f32,
    pub false_negative: f32,
    pub false_positive: f32,
    pub true_negative: f32,
}

impl ProductCodes {
    /// Derive the codes for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::InvalidConfiguration`] if foreground and
    /// background levels coincide or two outcomes would share a product value.
    pub fn new(config: &BinarizeConfig) -> MetricResult<Self> {
        if config.foreground_value == config.background_value {
            return Err(MetricError::InvalidConfiguration {
                reason: format!(
                    "foreground and background levels are both {}",
                    config.foreground_value
                ),
            });
        }

        let foreground = f32::from(config.foreground_value);
        let predicted_background = f32::from(PREDICTED_BACKGROUND_CODE);
        let reference_background = f32::from(REFERENCE_BACKGROUND_CODE);

        let codes = Self {
            true_positive: foreground * foreground,
            false_negative: foreground * reference_background,
            false_positive: predicted_background * foreground,
            true_negative: predicted_background * reference_background,
        };

        let values = codes.as_array();
        for (i, a) in values.iter().enumerate() {
            if values[i + 1..].contains(a) {
                return Err(MetricError::InvalidConfiguration {
                    reason: format!(
                        "foreground level {} maps two outcomes to product {a}",
                        config.foreground_value
                    ),
                });
            }
        }

        Ok(codes)
    }

    /// Codes in `[TP, FN, FP, TN]` order.
    pub const fn as_array(&self) -> [f32; 4] {
        [
            self.true_positive,
            self.false_negative,
            self.false_positive,
            self.true_negative,
        ]
    }
}

/// Count outcomes for two binarized `[height, width]` masks.
///
/// # Errors
///
/// Returns [`MetricError::DimensionMismatch`] before any counting when the
/// masks differ in shape, or [`MetricError::InvalidConfiguration`] for
/// unusable binarization levels.
pub fn confusion_counts<B: Backend>(
    predicted: Tensor<B, 2>,
    reference: Tensor<B, 2>,
    config: &BinarizeConfig,
) -> MetricResult<ConfusionCounts> {
    let codes = ProductCodes::new(config)?;
    ensure_same_shape(MaskShape::of(&predicted), MaskShape::of(&reference))?;

    Ok(count_products(predicted, reference, config, &codes))
}

/// Product-encoded counting over tensors of any rank.
///
/// Any value other than `config.foreground_value` counts as background, so
/// every element lands in exactly one outcome. Callers are responsible for
/// checking that both shapes agree.
pub(crate) fn count_products<B: Backend, const D: usize>(
    predicted: Tensor<B, D>,
    reference: Tensor<B, D>,
    config: &BinarizeConfig,
    codes: &ProductCodes,
) -> ConfusionCounts {
    let foreground = f32::from(config.foreground_value);

    let predicted_background = predicted.clone().not_equal_elem(foreground);
    let predicted =
        predicted.mask_fill(predicted_background, f32::from(PREDICTED_BACKGROUND_CODE));
    let reference_background = reference.clone().not_equal_elem(foreground);
    let reference =
        reference.mask_fill(reference_background, f32::from(REFERENCE_BACKGROUND_CODE));

    let product = predicted * reference;
    let count = |code: f32| -> u64 {
        product
            .clone()
            .equal_elem(code)
            .int()
            .sum()
            .into_scalar()
            .elem::<u64>()
    };

    ConfusionCounts {
        true_positives: count(codes.true_positive),
        true_negatives: count(codes.true_negative),
        false_positives: count(codes.false_positive),
        false_negatives: count(codes.false_negative),
    }
}
