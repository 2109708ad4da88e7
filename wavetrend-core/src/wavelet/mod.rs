//! Multiresolution decomposition seam and coefficient shrinkage.
//!
//! The transform itself is a black box behind [`MultiResTransform`]; this
//! module owns the coefficient containers, the init-time registry that maps a
//! validated wavelet key to a concrete transform, and the threshold engine
//! that denoises detail coefficients.

pub mod threshold;
pub mod transform;

pub use threshold::{noise_sigma, shrink, threshold, ShrinkageRule, ThresholdMethod};
pub use transform::{
    AtrousCascade, Decomposition, MultiResTransform, TransformRegistry, WaveletKey,
};
