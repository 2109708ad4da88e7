//! Per-bar derived values handed back to the host for display.

use serde::{Deserialize, Serialize};

/// Everything the host persists for one bar. Consumed for display only —
/// this is not a file format.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BarOutput {
    /// Denoised trend value at this bar.
    pub trend: f64,
    /// Difference of consecutive trend values.
    pub slope: f64,
    /// Scaled momentum before smoothing.
    pub momentum_raw: f64,
    /// Smoothed momentum.
    pub momentum: f64,
    /// Sign of the most recent unshrunk coefficient per level (-1, 0, +1).
    pub detail_signs: Vec<i8>,
    /// Smoothed volatility estimate.
    pub watr: f64,
    pub watr_upper: f64,
    pub watr_lower: f64,
    pub long_active: bool,
    pub short_active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_serialization_roundtrip() {
        let output = BarOutput {
            trend: 101.5,
            slope: 0.25,
            momentum_raw: 12.0,
            momentum: 9.5,
            detail_signs: vec![1, -1, 0],
            watr: 1.75,
            watr_upper: 105.0,
            watr_lower: 98.0,
            long_active: true,
            short_active: false,
        };
        let json = serde_json::to_string(&output).unwrap();
        let deser: BarOutput = serde_json::from_str(&json).unwrap();
        assert_eq!(output, deser);
    }
}
