//! Input structures for the batched MCC metric.

use burn::{prelude::*, tensor::backend::Backend};
use derive_new::new;

/// MCC metric input.
#[derive(new, Debug, Clone)]
pub struct MccInput<B: Backend> {
    /// Predicted masks with shape `[batch_size, 1, height, width]`, raw
    /// intensities in `0..=255`.
    pub predictions: Tensor<B, 4>,
    /// Reference masks with shape `[batch_size, 1, height, width]`, raw
    /// intensities in `0..=255`.
    pub references: Tensor<B, 4>,
}
