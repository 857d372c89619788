//! File-level evaluation: two mask paths in, one score out.

use std::path::Path;

use burn::tensor::{backend::Backend, Tensor};
use mcc_util::{binarize, load_mask_tensor, BinarizeConfig};
use serde::Serialize;

use crate::{
    confusion::{confusion_counts, ConfusionCounts, MaskShape},
    error::MetricResult,
    mcc::{matthews_correlation, DegenerateCase},
};

/// Outcome of comparing one predicted mask against its reference.
#[derive(Debug, Clone, Serialize)]
pub struct MaskEvaluation {
    pub shape: MaskShape,
    pub counts: ConfusionCounts,
    pub score: f64,
    /// Set when `score` is a policy value rather than the formula's result.
    pub degenerate: Option<DegenerateCase>,
}

impl MaskEvaluation {
    pub fn from_counts(shape: MaskShape, counts: ConfusionCounts) -> Self {
        Self {
            shape,
            counts,
            score: matthews_correlation(&counts),
            degenerate: DegenerateCase::detect(&counts),
        }
    }
}

/// Evaluate two already binarized `[height, width]` masks.
///
/// Values other than `config.foreground_value` count as background.
pub fn evaluate_masks<B: Backend>(
    predicted: Tensor<B, 2>,
    reference: Tensor<B, 2>,
    config: &BinarizeConfig,
) -> MetricResult<MaskEvaluation> {
    let shape = MaskShape::of(&predicted);
    let counts = confusion_counts(predicted, reference, config)?;

    Ok(MaskEvaluation::from_counts(shape, counts))
}

/// Load, binarize and compare a predicted mask file with a reference mask file.
///
/// # Errors
///
/// [`MetricError::Decode`](crate::MetricError::Decode) if either file cannot
/// be decoded, [`MetricError::DimensionMismatch`](crate::MetricError::DimensionMismatch)
/// if their sizes differ.
pub fn evaluate_mask_files<B, P, Q>(
    predicted_path: P,
    reference_path: Q,
    config: &BinarizeConfig,
    device: &B::Device,
) -> MetricResult<MaskEvaluation>
where
    B: Backend,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let predicted = binarize(load_mask_tensor::<B, _>(predicted_path, device)?, config);
    let reference = binarize(load_mask_tensor::<B, _>(reference_path, device)?, config);

    evaluate_masks(predicted, reference, config)
}

/// MCC between the masks stored at `predicted_path` and `reference_path`.
pub fn mcc_from_paths<B, P, Q>(
    predicted_path: P,
    reference_path: Q,
    config: &BinarizeConfig,
    device: &B::Device,
) -> MetricResult<f64>
where
    B: Backend,
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    evaluate_mask_files::<B, _, _>(predicted_path, reference_path, config, device)
        .map(|evaluation| evaluation.score)
}
