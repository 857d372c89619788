//! Error types for mask evaluation.

use mcc_util::ImageError;
use thiserror::Error;

use crate::confusion::MaskShape;

/// The error type for MCC evaluation.
#[derive(Error, Debug)]
pub enum MetricError {
    /// A mask could not be read or decoded.
    #[error(transparent)]
    Decode(#[from] ImageError),

    /// Predicted and reference masks differ in width or height.
    #[error("mask dimensions must match: predicted={predicted}, reference={reference}")]
    DimensionMismatch {
        /// Shape of the predicted mask.
        predicted: MaskShape,
        /// Shape of the reference mask.
        reference: MaskShape,
    },

    /// Predicted and reference batches hold a different number of masks.
    #[error("batch size mismatch: predicted={predicted}, reference={reference}")]
    BatchSizeMismatch { predicted: usize, reference: usize },

    /// Batched masks must carry exactly one channel.
    #[error("invalid channel count: expected 1 for mask, got {actual}")]
    InvalidMaskChannels { actual: usize },

    /// The binarization levels cannot produce four distinct confusion codes.
    #[error("invalid binarization configuration: {reason}")]
    InvalidConfiguration {
        /// Why the configuration was rejected.
        reason: String,
    },
}

/// A specialized `Result` type for metric operations.
pub type MetricResult<T> = Result<T, MetricError>;
