//! Shrinkage thresholds for detail coefficients.
//!
//! Three estimators share one robust noise estimate (median absolute
//! coefficient / 0.6745):
//! - Universal: sigma * sqrt(2 ln N).
//! - BayesShrink: sigma^2 / sigma_signal, scaled up mildly on coarser levels;
//!   falls back to Universal when the level looks like pure noise.
//! - SURE: Stein's unbiased risk estimate minimized over the sorted
//!   coefficient magnitudes; falls back to Universal below two samples.
//!
//! Degenerate input (empty array, zero variance) yields a threshold of 0 or
//! a clamped sigma, never an error.

use serde::{Deserialize, Serialize};

/// Lower clamp for the noise estimate, keeping later divisions finite.
const MIN_SIGMA: f64 = 1e-10;

/// Threshold estimator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThresholdMethod {
    Universal,
    BayesShrink,
    Sure,
}

impl Default for ThresholdMethod {
    fn default() -> Self {
        Self::Universal
    }
}

/// How coefficients below/above the threshold are attenuated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShrinkageRule {
    Soft,
    Hard,
}

impl Default for ShrinkageRule {
    fn default() -> Self {
        Self::Soft
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn stddev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

/// Robust noise estimate: median(|c|) / 0.6745, clamped to
/// [MIN_SIGMA, 2 * stddev] so a near-constant array cannot produce a zero or
/// runaway sigma.
pub fn noise_sigma(coeffs: &[f64]) -> f64 {
    if coeffs.is_empty() {
        return 0.0;
    }
    let mut magnitudes: Vec<f64> = coeffs.iter().map(|c| c.abs()).collect();
    magnitudes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let n = magnitudes.len();
    let median = if n % 2 == 1 {
        magnitudes[n / 2]
    } else {
        0.5 * (magnitudes[n / 2 - 1] + magnitudes[n / 2])
    };

    let sigma = median / 0.6745;
    let upper = (2.0 * stddev(coeffs)).max(MIN_SIGMA);
    sigma.clamp(MIN_SIGMA, upper)
}

/// Compute the shrinkage threshold for one detail level.
///
/// `level` is 1-based (1 = finest scale); only BayesShrink uses it.
/// Empty input returns 0 for every method.
pub fn threshold(coeffs: &[f64], method: ThresholdMethod, level: usize) -> f64 {
    if coeffs.is_empty() {
        return 0.0;
    }
    let sigma = noise_sigma(coeffs);
    match method {
        ThresholdMethod::Universal => universal(coeffs.len(), sigma),
        ThresholdMethod::BayesShrink => bayes_shrink(coeffs, sigma, level),
        ThresholdMethod::Sure => sure(coeffs, sigma),
    }
}

fn universal(n: usize, sigma: f64) -> f64 {
    sigma * (2.0 * (n as f64).ln()).sqrt()
}

fn bayes_shrink(coeffs: &[f64], sigma: f64, level: usize) -> f64 {
    let sigma_y = stddev(coeffs);
    let signal_var = sigma_y * sigma_y - sigma * sigma;
    if signal_var <= 0.0 {
        // Pure noise on this level.
        return universal(coeffs.len(), sigma);
    }
    let base = sigma * sigma / signal_var.sqrt();
    // Coarser levels get a mildly larger threshold.
    let depth_scale = 1.0 + 0.1 * level.saturating_sub(1) as f64;
    base * depth_scale
}

fn sure(coeffs: &[f64], sigma: f64) -> f64 {
    let n = coeffs.len();
    if n < 2 {
        return universal(n, sigma);
    }

    let mut magnitudes: Vec<f64> = coeffs.iter().map(|c| c.abs()).collect();
    magnitudes.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    // prefix[k] = sum of the k smallest squared magnitudes.
    let mut prefix = vec![0.0; n + 1];
    for (i, m) in magnitudes.iter().enumerate() {
        prefix[i + 1] = prefix[i] + m * m;
    }

    // count_above[i] = how many magnitudes are strictly greater than
    // magnitudes[i]; equal values share the count of their group.
    let mut count_above = vec![0usize; n];
    for i in (0..n).rev() {
        if i + 1 < n && magnitudes[i + 1] == magnitudes[i] {
            count_above[i] = count_above[i + 1];
        } else {
            count_above[i] = n - 1 - i;
        }
    }

    let sigma_sq = (sigma * sigma).max(MIN_SIGMA * MIN_SIGMA);
    let mut best = (f64::INFINITY, magnitudes[0]);
    for i in 0..n {
        let t = magnitudes[i];
        let above = count_above[i];
        let sum_min = prefix[n - above] + above as f64 * t * t;
        let risk = (n as f64 - 2.0 * above as f64 + sum_min) / sigma_sq;
        if risk < best.0 {
            best = (risk, t);
        }
    }
    best.1
}

/// Soft shrinkage of one coefficient: zero inside the threshold, magnitude
/// reduced by it outside.
pub fn soft_shrink(c: f64, t: f64) -> f64 {
    if c.abs() <= t {
        0.0
    } else {
        c.signum() * (c.abs() - t)
    }
}

/// Hard shrinkage: zero inside the threshold, unchanged outside.
pub fn hard_shrink(c: f64, t: f64) -> f64 {
    if c.abs() <= t {
        0.0
    } else {
        c
    }
}

/// Apply the shrinkage rule in place.
pub fn shrink(coeffs: &mut [f64], t: f64, rule: ShrinkageRule) {
    for c in coeffs.iter_mut() {
        *c = match rule {
            ShrinkageRule::Soft => soft_shrink(*c, t),
            ShrinkageRule::Hard => hard_shrink(*c, t),
        };
    }
}
