//! `mcc`: score predicted segmentation masks against ground truth with the
//! Matthews correlation coefficient.
//!
//! This crate wires the metric crates to a compile-time selected Burn backend
//! and provides single-pair and directory evaluation for the `mcc` binary.

pub mod backend;
pub mod evaluation;

// Re-export backend types for convenience
#[doc(inline)]
pub use backend::burn_backend_types;
#[doc(inline)]
pub use mcc_metric as metric;
#[doc(inline)]
pub use mcc_util as util;
