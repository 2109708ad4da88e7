//! Level-weighted momentum oscillator over raw detail coefficients.
//!
//! Works on coefficients captured *before* shrinkage: denoising is for the
//! trend display, momentum must see the un-denoised market energy. Each
//! level contributes a windowed statistic (signed mean, or RMS carrying the
//! mean's sign), weighted like WATR; the accumulated value is scaled into a
//! threshold-friendly range and EMA-smoothed with a configurable alpha.

use super::level_weight;
use serde::{Deserialize, Serialize};

/// Per-level windowed statistic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MomentumMode {
    /// Signed mean of the window.
    Sum,
    /// RMS of the window, signed by the mean's sign.
    Sign,
}

impl Default for MomentumMode {
    fn default() -> Self {
        Self::Sum
    }
}

/// Stateless accumulation over levels 1..k, before scaling and smoothing.
pub fn raw_momentum(
    details: &[Vec<f64>],
    k: usize,
    window_size: usize,
    decay: f64,
    mode: MomentumMode,
) -> f64 {
    let mut accumulated = 0.0;
    for (level, coeffs) in details.iter().take(k).enumerate() {
        let window = &coeffs[coeffs.len().saturating_sub(window_size.max(1))..];
        if window.is_empty() {
            continue;
        }
        let mean = window.iter().sum::<f64>() / window.len() as f64;
        let statistic = match mode {
            MomentumMode::Sum => mean,
            MomentumMode::Sign => {
                let rms =
                    (window.iter().map(|c| c * c).sum::<f64>() / window.len() as f64).sqrt();
                if mean > 0.0 {
                    rms
                } else if mean < 0.0 {
                    -rms
                } else {
                    0.0
                }
            }
        };
        accumulated += statistic * level_weight(level, decay);
    }
    accumulated
}

#[derive(Debug, Clone)]
pub struct MomentumOscillator {
    window_size: usize,
    level_decay: f64,
    scaling: f64,
    alpha: f64,
    mode: MomentumMode,
    ema: f64,
    last_raw: f64,
    seeded: bool,
}

impl MomentumOscillator {
    pub fn new(
        window_size: usize,
        level_decay: f64,
        scaling: f64,
        alpha: f64,
        mode: MomentumMode,
    ) -> Self {
        Self {
            window_size: window_size.max(1),
            level_decay,
            scaling,
            alpha: if alpha > 0.0 && alpha <= 1.0 { alpha } else { 0.2 },
            mode,
            ema: 0.0,
            last_raw: 0.0,
            seeded: false,
        }
    }

    /// Fold one bar's unshrunk detail coefficients into the oscillator.
    /// Returns the smoothed, scaled value.
    pub fn calculate(&mut self, details: &[Vec<f64>], k: usize) -> f64 {
        let scaled =
            raw_momentum(details, k, self.window_size, self.level_decay, self.mode) * self.scaling;
        self.last_raw = scaled;

        if self.seeded {
            self.ema = self.alpha * scaled + (1.0 - self.alpha) * self.ema;
        } else {
            self.ema = scaled;
            self.seeded = true;
        }
        self.ema
    }

    /// Last scaled value before smoothing.
    pub fn raw(&self) -> f64 {
        self.last_raw
    }

    /// Last smoothed value (0 until the first calculate).
    pub fn value(&self) -> f64 {
        self.ema
    }

    /// Back to zero state. Called on any transform configuration change.
    pub fn reset(&mut self) {
        self.ema = 0.0;
        self.last_raw = 0.0;
        self.seeded = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    fn single_level(coeffs: &[f64]) -> Vec<Vec<f64>> {
        vec![coeffs.to_vec()]
    }

    #[test]
    fn sum_mode_is_windowed_signed_mean() {
        let details = single_level(&[100.0, 100.0, 1.0, 2.0, 3.0]);
        let raw = raw_momentum(&details, 1, 3, 0.5, MomentumMode::Sum);
        assert_approx(raw, 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn sign_mode_is_rms_signed_by_mean() {
        let details = single_level(&[3.0, -4.0, 3.0, -4.0]);
        // mean = -0.5, rms = sqrt((9+16+9+16)/4) = sqrt(12.5)
        let raw = raw_momentum(&details, 1, 4, 0.5, MomentumMode::Sign);
        assert_approx(raw, -(12.5f64).sqrt(), DEFAULT_EPSILON);
    }

    #[test]
    fn sign_mode_zero_mean_yields_zero() {
        let details = single_level(&[2.0, -2.0]);
        assert_eq!(raw_momentum(&details, 1, 2, 0.5, MomentumMode::Sign), 0.0);
    }

    #[test]
    fn coarser_levels_are_discounted() {
        let details = vec![vec![1.0; 4], vec![1.0; 4]];
        let raw = raw_momentum(&details, 2, 4, 0.5, MomentumMode::Sum);
        assert_approx(raw, 1.0 + 1.0 / 1.5, DEFAULT_EPSILON);
    }

    #[test]
    fn k_limits_levels_considered() {
        let details = vec![vec![1.0; 4], vec![100.0; 4]];
        let raw = raw_momentum(&details, 1, 4, 0.5, MomentumMode::Sum);
        assert_approx(raw, 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn scaling_factor_applies_before_smoothing() {
        let mut osc = MomentumOscillator::new(4, 0.5, 100.0, 0.5, MomentumMode::Sum);
        let smoothed = osc.calculate(&single_level(&[0.01; 4]), 1);
        assert_approx(osc.raw(), 1.0, DEFAULT_EPSILON);
        // Seeded with the first scaled value.
        assert_approx(smoothed, 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_smooths_with_configured_alpha() {
        let mut osc = MomentumOscillator::new(4, 0.5, 1.0, 0.5, MomentumMode::Sum);
        osc.calculate(&single_level(&[2.0; 4]), 1);
        let second = osc.calculate(&single_level(&[4.0; 4]), 1);
        assert_approx(second, 0.5 * 4.0 + 0.5 * 2.0, DEFAULT_EPSILON);
    }

    #[test]
    fn invalid_alpha_normalizes_to_default() {
        let mut osc = MomentumOscillator::new(4, 0.5, 1.0, 0.0, MomentumMode::Sum);
        osc.calculate(&single_level(&[1.0; 4]), 1);
        let second = osc.calculate(&single_level(&[2.0; 4]), 1);
        assert_approx(second, 0.2 * 2.0 + 0.8 * 1.0, DEFAULT_EPSILON);
    }

    #[test]
    fn reset_zeroes_the_oscillator() {
        let mut osc = MomentumOscillator::new(4, 0.5, 1.0, 0.5, MomentumMode::Sum);
        osc.calculate(&single_level(&[5.0; 4]), 1);
        osc.reset();
        assert_eq!(osc.value(), 0.0);
        assert_eq!(osc.raw(), 0.0);
    }

    #[test]
    fn empty_details_yield_zero() {
        let mut osc = MomentumOscillator::new(4, 0.5, 10.0, 0.5, MomentumMode::Sum);
        assert_eq!(osc.calculate(&[], 3), 0.0);
    }
}
