//! Coefficient-driven indicators: WATR volatility and the momentum
//! oscillator.
//!
//! Both consume per-level detail arrays from the transform, weight finer
//! scales near 1.0 and discount coarser scales hyperbolically, and smooth
//! with a recursive EMA. They hold per-instrument state and are reset
//! whenever the transform configuration changes.

pub mod momentum;
pub mod watr;

pub use momentum::{MomentumMode, MomentumOscillator};
pub use watr::Watr;

/// Weight for a 0-based level index: finest scale near 1.0, coarser scales
/// discounted hyperbolically.
pub(crate) fn level_weight(level: usize, decay: f64) -> f64 {
    1.0 / (1.0 + level as f64 * decay)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
