//! # MCC Metric
//!
//! Matthews correlation coefficient between a predicted binary segmentation
//! mask and a reference mask, implemented on Burn tensors.
//!
//! Both masks are thresholded to two levels, checked for equal size, compared
//! pixel by pixel into [`ConfusionCounts`] and reduced to a single score in
//! `[-1, 1]`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::NdArray;
//! use mcc_metric::{mcc_from_paths, BinarizeConfig};
//!
//! let score = mcc_from_paths::<NdArray, _, _>(
//!     "prediction.png",
//!     "ground_truth.png",
//!     &BinarizeConfig::new(),
//!     &Default::default(),
//! )?;
//! println!("MCC: {score}");
//! ```
//!
//! ## Conventions
//!
//! - Intensities strictly above the threshold (default 127) are foreground.
//! - False positives and false negatives are labelled from the reference
//!   mask's point of view; see [`confusion`] for the exact table.
//! - Identical masks score exactly `1.0`, fully disjoint masks exactly `-1.0`.

pub mod confusion;
pub mod error;
pub mod evaluate;
pub mod input;
pub mod mcc;

pub use confusion::{confusion_counts, ConfusionCounts, MaskShape, ProductCodes};
pub use error::{MetricError, MetricResult};
pub use evaluate::{evaluate_mask_files, evaluate_masks, mcc_from_paths, MaskEvaluation};
pub use input::MccInput;
pub use mcc::{calculate_mcc, matthews_correlation, DegenerateCase, MccMetric};
pub use mcc_util::BinarizeConfig;
