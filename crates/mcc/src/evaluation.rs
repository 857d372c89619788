use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use anyhow::Result;
use burn::config::Config;
use mcc_metric::{
    evaluate_mask_files, matthews_correlation, BinarizeConfig, ConfusionCounts, MaskEvaluation,
};
use mcc_util::is_supported_image_format;
use serde::Serialize;

use crate::backend::burn_backend_types::{EvalBackend, EvalDevice};

/// Evaluation configuration.
#[derive(Debug, Clone)]
pub struct EvaluationConfig {
    /// Predicted mask (file or directory).
    pub predicted_path: PathBuf,
    /// Reference mask (file or directory).
    pub reference_path: PathBuf,
    /// Thresholding applied to both masks.
    pub binarize: BinarizeConfig,
}

impl EvaluationConfig {
    /// Creates a new evaluation configuration.
    pub fn new(
        predicted_path: impl Into<PathBuf>,
        reference_path: impl Into<PathBuf>,
        binarize: BinarizeConfig,
    ) -> Self {
        Self {
            predicted_path: predicted_path.into(),
            reference_path: reference_path.into(),
            binarize,
        }
    }
}

/// Thresholding overrides given on the command line.
#[derive(Debug, Clone, Default)]
pub struct BinarizeOverrides {
    /// JSON file written by [`Config::save`].
    pub config_file: Option<PathBuf>,
    pub threshold: Option<u8>,
    pub foreground_value: Option<u8>,
    pub background_value: Option<u8>,
}

impl BinarizeOverrides {
    /// Start from the config file (or defaults) and apply explicit overrides.
    pub fn resolve(&self) -> Result<BinarizeConfig> {
        let mut config = match &self.config_file {
            Some(path) => {
                tracing::info!(path = %path.display(), "loading binarization config");
                BinarizeConfig::load(path)?
            }
            None => BinarizeConfig::new(),
        };

        if let Some(threshold) = self.threshold {
            config.threshold = threshold;
        }
        if let Some(foreground) = self.foreground_value {
            config.foreground_value = foreground;
        }
        if let Some(background) = self.background_value {
            config.background_value = background;
        }

        Ok(config)
    }
}

/// A predicted mask matched with its reference by file stem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaskPair {
    pub name: String,
    pub predicted: PathBuf,
    pub reference: PathBuf,
}

/// Per-pair entry of a directory run.
#[derive(Debug, Clone, Serialize)]
pub struct PairReport {
    pub name: String,
    #[serde(flatten)]
    pub evaluation: MaskEvaluation,
}

/// Summary of a directory run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub pairs: Vec<PairReport>,
    /// Names of pairs that could not be evaluated.
    pub failed: Vec<String>,
    /// Mean of the per-pair scores.
    pub mean_score: Option<f64>,
    /// Counts summed over every evaluated pair.
    pub pooled_counts: ConfusionCounts,
    /// MCC of `pooled_counts`.
    pub pooled_score: Option<f64>,
}

impl BatchReport {
    fn push(&mut self, report: PairReport) {
        self.pooled_counts += report.evaluation.counts;
        self.pairs.push(report);
    }

    fn finish(mut self) -> Self {
        if !self.pairs.is_empty() {
            let sum: f64 = self.pairs.iter().map(|p| p.evaluation.score).sum();
            self.mean_score = Some(sum / self.pairs.len() as f64);
            self.pooled_score = Some(matthews_correlation(&self.pooled_counts));
        }
        self
    }
}

/// Compares one predicted mask file with one reference mask file.
///
/// # Errors
///
/// Returns an error if either mask cannot be decoded or their dimensions
/// differ.
pub fn run_single(config: &EvaluationConfig, device: &EvalDevice) -> Result<MaskEvaluation> {
    tracing::info!(
        predicted = %config.predicted_path.display(),
        reference = %config.reference_path.display(),
        threshold = config.binarize.threshold,
        "evaluating mask pair",
    );

    let evaluation = evaluate_mask_files::<EvalBackend, _, _>(
        &config.predicted_path,
        &config.reference_path,
        &config.binarize,
        device,
    )?;

    tracing::info!(
        score = evaluation.score,
        tp = evaluation.counts.true_positives,
        tn = evaluation.counts.true_negatives,
        fp = evaluation.counts.false_positives,
        fn_ = evaluation.counts.false_negatives,
        "evaluation completed",
    );
    Ok(evaluation)
}

/// Compares every predicted mask in a directory with the reference mask of
/// the same stem.
///
/// Pairs that fail are logged and listed in [`BatchReport::failed`]; the run
/// continues with the remaining pairs.
pub fn run_directory(config: &EvaluationConfig, device: &EvalDevice) -> Result<BatchReport> {
    let pairs = pair_masks(&config.predicted_path, &config.reference_path)?;
    tracing::info!(pairs = pairs.len(), "matched mask pairs");

    let mut report = BatchReport::default();
    for pair in pairs {
        match evaluate_mask_files::<EvalBackend, _, _>(
            &pair.predicted,
            &pair.reference,
            &config.binarize,
            device,
        ) {
            Ok(evaluation) => {
                tracing::info!(name = %pair.name, score = evaluation.score, "evaluated");
                report.push(PairReport {
                    name: pair.name,
                    evaluation,
                });
            }
            Err(e) => {
                tracing::error!(name = %pair.name, error = %e, "failed to evaluate mask pair");
                report.failed.push(pair.name);
            }
        }
    }

    Ok(report.finish())
}

/// Matches supported image files of two directories by file stem.
///
/// Files present on only one side are skipped with a warning. Pairs are
/// returned sorted by name.
pub fn pair_masks(predicted_dir: &Path, reference_dir: &Path) -> Result<Vec<MaskPair>> {
    let predicted = masks_by_stem(predicted_dir)?;
    let mut reference = masks_by_stem(reference_dir)?;

    let mut pairs = Vec::with_capacity(predicted.len());
    for (name, predicted_path) in predicted {
        match reference.remove(&name) {
            Some(reference_path) => pairs.push(MaskPair {
                name,
                predicted: predicted_path,
                reference: reference_path,
            }),
            None => tracing::warn!(%name, "no reference mask for prediction"),
        }
    }
    for name in reference.keys() {
        tracing::warn!(%name, "no prediction for reference mask");
    }

    Ok(pairs)
}

fn masks_by_stem(dir: &Path) -> Result<BTreeMap<String, PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Mask directory does not exist: {}", dir.display());
    }

    let mut masks = BTreeMap::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() || !is_supported_image_format(&path) {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            masks.insert(stem.to_owned(), path.clone());
        }
    }
    Ok(masks)
}
