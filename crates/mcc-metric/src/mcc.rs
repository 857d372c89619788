//! Matthews correlation coefficient for binary segmentation masks.
//!
//! The score is evaluated from [`ConfusionCounts`] with two fixed policy
//! values taking precedence over the formula:
//!
//! 1. no false positives and no false negatives → exactly `1.0`;
//! 2. otherwise, no true positives and no true negatives → exactly `-1.0`;
//! 3. otherwise, any zero marginal sum (TP+FP, TP+FN, TN+FP or TN+FN) → `0.0`;
//! 4. otherwise `(TP·TN − FP·FN) / sqrt((TP+FP)(TP+FN)(TN+FP)(TN+FN))`.
//!
//! Case 3 is reached when one mask is entirely foreground or entirely
//! background while the other is not, e.g. a prediction covering the whole
//! image. The formula is 0/0 there.

use core::marker::PhantomData;

use burn::tensor::{backend::Backend, Tensor};
use mcc_util::{binarize, BinarizeConfig};
use serde::Serialize;

use crate::{
    confusion::{confusion_counts, count_products, ConfusionCounts, MaskShape, ProductCodes},
    error::{MetricError, MetricResult},
    input::MccInput,
};

/// Inputs whose score is fixed by policy instead of the formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegenerateCase {
    /// No disagreement in either direction.
    Identical,
    /// Every pixel disagrees.
    NoMatch,
    /// One mask has a single class while the other has both.
    ZeroMarginal,
}

impl DegenerateCase {
    /// Classify `counts`, in policy order.
    pub const fn detect(counts: &ConfusionCounts) -> Option<Self> {
        if counts.false_positives == 0 && counts.false_negatives == 0 {
            Some(Self::Identical)
        } else if counts.true_positives == 0 && counts.true_negatives == 0 {
            Some(Self::NoMatch)
        } else if counts.true_positives + counts.false_positives == 0
            || counts.true_positives + counts.false_negatives == 0
            || counts.true_negatives + counts.false_positives == 0
            || counts.true_negatives + counts.false_negatives == 0
        {
            Some(Self::ZeroMarginal)
        } else {
            None
        }
    }

    pub const fn score(self) -> f64 {
        match self {
            Self::Identical => 1.0,
            Self::NoMatch => -1.0,
            Self::ZeroMarginal => 0.0,
        }
    }
}

/// Matthews correlation coefficient of `counts`.
///
/// The numerator is computed exactly in `i128`; the denominator is taken as
/// the product of two square roots so that sums in the millions of pixels keep
/// full `f64` precision.
pub fn matthews_correlation(counts: &ConfusionCounts) -> f64 {
    if let Some(case) = DegenerateCase::detect(counts) {
        return case.score();
    }

    let tp = counts.true_positives;
    let tn = counts.true_negatives;
    let fp = counts.false_positives;
    let fn_ = counts.false_negatives;

    let numerator = i128::from(tp) * i128::from(tn) - i128::from(fp) * i128::from(fn_);
    let denominator = ((tp + fp) as f64 * (tp + fn_) as f64).sqrt()
        * ((tn + fp) as f64 * (tn + fn_) as f64).sqrt();

    (numerator as f64 / denominator).clamp(-1.0, 1.0)
}

/// Calculate MCC for a pair of `[height, width]` intensity masks.
///
/// Both masks are binarized with `config` before counting.
pub fn calculate_mcc<B: Backend>(
    predicted: Tensor<B, 2>,
    reference: Tensor<B, 2>,
    config: &BinarizeConfig,
) -> MetricResult<f64> {
    let counts = confusion_counts(
        binarize(predicted, config),
        binarize(reference, config),
        config,
    )?;
    Ok(matthews_correlation(&counts))
}

// --- MCC Metric ---

/// MCC accumulated over batches of masks.
///
/// Confusion counts are pooled across every mask seen since the last
/// [`clear`](MccMetric::clear), so the value is the MCC of the whole set, not
/// a mean of per-mask scores.
#[derive(Debug, Clone)]
pub struct MccMetric<B: Backend> {
    state: MccState,
    config: BinarizeConfig,
    _b: PhantomData<B>,
}

#[derive(Debug, Clone, Default)]
struct MccState {
    counts: ConfusionCounts,
    count: usize,
}

impl<B: Backend> Default for MccMetric<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: Backend> MccMetric<B> {
    pub fn new() -> Self {
        Self::with_config(BinarizeConfig::new())
    }

    pub fn with_config(config: BinarizeConfig) -> Self {
        Self {
            state: MccState::default(),
            config,
            _b: PhantomData,
        }
    }

    /// Add a batch of `[batch, 1, height, width]` intensity masks and return the
    /// updated value.
    pub fn update(&mut self, item: &MccInput<B>) -> MetricResult<f64> {
        let codes = ProductCodes::new(&self.config)?;
        let [batch, channels, height, width] = item.predictions.dims();
        let [ref_batch, ref_channels, ref_height, ref_width] = item.references.dims();

        if batch != ref_batch {
            return Err(MetricError::BatchSizeMismatch {
                predicted: batch,
                reference: ref_batch,
            });
        }
        for actual in [channels, ref_channels] {
            if actual != 1 {
                return Err(MetricError::InvalidMaskChannels { actual });
            }
        }
        if (height, width) != (ref_height, ref_width) {
            return Err(MetricError::DimensionMismatch {
                predicted: MaskShape::new(width, height),
                reference: MaskShape::new(ref_width, ref_height),
            });
        }

        let predictions = binarize(item.predictions.clone(), &self.config);
        let references = binarize(item.references.clone(), &self.config);
        self.state.counts += count_products(predictions, references, &self.config, &codes);
        self.state.count += batch;

        Ok(self.value())
    }

    /// Current MCC, or `0.0` before any mask has been added.
    pub fn value(&self) -> f64 {
        if self.state.count == 0 {
            return 0.0;
        }
        matthews_correlation(&self.state.counts)
    }

    /// Pooled counts so far.
    pub const fn counts(&self) -> ConfusionCounts {
        self.state.counts
    }

    /// Number of masks added so far.
    pub const fn items(&self) -> usize {
        self.state.count
    }

    pub fn clear(&mut self) {
        self.state = MccState::default();
    }
}

#[cfg(test)]
mod tests {
    use burn::tensor::TensorData;

    use super::*;
    use crate::tests::TestBackend;

    #[test]
    fn identical_counts_score_exactly_one() {
        assert_eq!(matthews_correlation(&ConfusionCounts::new(10, 90, 0, 0)), 1.0);
        assert_eq!(matthews_correlation(&ConfusionCounts::new(0, 100, 0, 0)), 1.0);
        assert_eq!(matthews_correlation(&ConfusionCounts::new(0, 0, 0, 0)), 1.0);
    }

    #[test]
    fn disjoint_counts_score_exactly_minus_one() {
        assert_eq!(matthews_correlation(&ConfusionCounts::new(0, 0, 7, 3)), -1.0);
        assert_eq!(matthews_correlation(&ConfusionCounts::new(0, 0, 0, 5)), -1.0);
    }

    #[test]
    fn degenerate_cases_follow_policy_order() {
        assert_eq!(
            DegenerateCase::detect(&ConfusionCounts::new(0, 0, 0, 0)),
            Some(DegenerateCase::Identical)
        );
        assert_eq!(
            DegenerateCase::detect(&ConfusionCounts::new(0, 0, 1, 0)),
            Some(DegenerateCase::NoMatch)
        );
        assert_eq!(
            DegenerateCase::detect(&ConfusionCounts::new(1, 0, 1, 0)),
            Some(DegenerateCase::ZeroMarginal)
        );
        assert_eq!(DegenerateCase::detect(&ConfusionCounts::new(1, 1, 1, 0)), None);
    }

    #[test]
    fn full_foreground_prediction_scores_zero() {
        // every pixel predicted foreground: only TP (65025) and FN (510) occur
        let counts = ConfusionCounts::new(40, 0, 0, 60);

        assert_eq!(matthews_correlation(&counts), 0.0);
    }

    #[test]
    fn general_case_matches_closed_form() {
        let counts = ConfusionCounts::new(30, 40, 5, 5);
        let expected = (30.0 * 40.0 - 5.0 * 5.0) / (35.0_f64 * 35.0 * 45.0 * 45.0).sqrt();

        let mcc = matthews_correlation(&counts);

        assert!((mcc - expected).abs() < 1e-9, "{mcc} != {expected}");
    }

    #[test]
    fn score_is_symmetric_in_false_positives_and_negatives() {
        let a = matthews_correlation(&ConfusionCounts::new(12, 50, 3, 9));
        let b = matthews_correlation(&ConfusionCounts::new(12, 50, 9, 3));

        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn score_stays_within_bounds() {
        for tp in [0_u64, 1, 4, 50] {
            for tn in [0_u64, 2, 9, 70] {
                for fp in [0_u64, 1, 13] {
                    for fn_ in [0_u64, 3, 40] {
                        let counts = ConfusionCounts::new(tp, tn, fp, fn_);
                        if counts.total() == 0 {
                            continue;
                        }
                        let mcc = matthews_correlation(&counts);
                        assert!((-1.0..=1.0).contains(&mcc), "{counts:?} -> {mcc}");
                    }
                }
            }
        }
    }

    #[test]
    fn large_counts_keep_precision() {
        // tens of millions of pixels per category
        let counts = ConfusionCounts::new(20_000_000, 60_000_000, 1_000_000, 3_000_000);
        let (tp, tn, fp, fn_) = (2.0e7_f64, 6.0e7, 1.0e6, 3.0e6);
        let expected =
            (tp * tn - fp * fn_) / ((tp + fp) * (tp + fn_) * (tn + fp) * (tn + fn_)).sqrt();

        let mcc = matthews_correlation(&counts);

        assert!((mcc - expected).abs() < 1e-12);
    }

    #[test]
    fn calculate_mcc_binarizes_raw_intensities() {
        let device = Default::default();
        let config = BinarizeConfig::new();
        let predicted = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[127.0, 128.0], [3.0, 250.0]]),
            &device,
        );
        let reference = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[0.0, 255.0], [0.0, 255.0]]),
            &device,
        );

        let mcc = calculate_mcc(predicted, reference, &config).unwrap();

        assert_eq!(mcc, 1.0);
    }

    #[test]
    fn calculate_mcc_of_inverse_masks_is_minus_one() {
        let device = Default::default();
        let config = BinarizeConfig::new();
        let predicted = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[255.0, 0.0, 0.0], [255.0, 255.0, 0.0]]),
            &device,
        );
        let reference = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[0.0, 255.0, 255.0], [0.0, 0.0, 255.0]]),
            &device,
        );

        let mcc = calculate_mcc(predicted, reference, &config).unwrap();

        assert_eq!(mcc, -1.0);
    }

    #[test]
    fn metric_pools_counts_across_updates() {
        let device = Default::default();
        let mut metric = MccMetric::<TestBackend>::new();
        let first = MccInput::new(
            Tensor::from_data(TensorData::from([[[[255.0, 0.0], [0.0, 0.0]]]]), &device),
            Tensor::from_data(TensorData::from([[[[255.0, 255.0], [0.0, 0.0]]]]), &device),
        );
        let second = MccInput::new(
            Tensor::from_data(TensorData::from([[[[0.0, 255.0], [255.0, 0.0]]]]), &device),
            Tensor::from_data(TensorData::from([[[[0.0, 255.0], [0.0, 0.0]]]]), &device),
        );

        metric.update(&first).unwrap();
        let value = metric.update(&second).unwrap();

        assert_eq!(metric.items(), 2);
        assert_eq!(metric.counts(), ConfusionCounts::new(2, 4, 1, 1));
        assert!((value - matthews_correlation(&ConfusionCounts::new(2, 4, 1, 1))).abs() < 1e-12);
    }

    #[test]
    fn metric_rejects_mismatched_batches() {
        let device = Default::default();
        let mut metric = MccMetric::<TestBackend>::new();
        let input = MccInput::new(
            Tensor::zeros([2, 1, 4, 4], &device),
            Tensor::zeros([1, 1, 4, 4], &device),
        );

        assert!(matches!(
            metric.update(&input),
            Err(MetricError::BatchSizeMismatch {
                predicted: 2,
                reference: 1
            })
        ));
        assert_eq!(metric.items(), 0);
    }

    #[test]
    fn metric_rejects_mismatched_shapes_and_channels() {
        let device = Default::default();
        let mut metric = MccMetric::<TestBackend>::new();

        let shapes = MccInput::new(
            Tensor::zeros([1, 1, 10, 10], &device),
            Tensor::zeros([1, 1, 11, 10], &device),
        );
        assert!(matches!(
            metric.update(&shapes),
            Err(MetricError::DimensionMismatch { .. })
        ));

        let channels = MccInput::new(
            Tensor::zeros([1, 3, 4, 4], &device),
            Tensor::zeros([1, 3, 4, 4], &device),
        );
        assert!(matches!(
            metric.update(&channels),
            Err(MetricError::InvalidMaskChannels { actual: 3 })
        ));
    }

    #[test]
    fn metric_clear_resets_state() {
        let device = Default::default();
        let mut metric = MccMetric::<TestBackend>::new();
        let input = MccInput::new(
            Tensor::zeros([1, 1, 2, 2], &device),
            Tensor::ones([1, 1, 2, 2], &device).mul_scalar(255.0),
        );

        assert_eq!(metric.update(&input).unwrap(), -1.0);
        metric.clear();

        assert_eq!(metric.items(), 0);
        assert_eq!(metric.counts(), ConfusionCounts::default());
        assert_eq!(metric.value(), 0.0);
    }
}
