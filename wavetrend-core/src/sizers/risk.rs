//! Risk-capped sizing.
//!
//! # Formula
//! ```text
//! risk_per_unit = stop_distance_points * point_value
//! final_quantity = min(base_quantity, floor(max_risk_dollars / risk_per_unit))
//! ```
//! The risk cap is inactive when `max_risk_dollars <= 0` or the stop distance
//! is non-positive; the capped quantity is floored at 1 unit as long as the
//! base quantity was at least 1. Non-positive inputs degrade gracefully —
//! sizing never panics.

/// Result of one sizing decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizedPosition {
    pub final_quantity: i64,
    pub risk_per_unit: f64,
    pub total_risk: f64,
}

/// Cap `base_quantity` so the position risks at most `max_risk_dollars` at
/// the stop.
pub fn size(
    base_quantity: i64,
    max_risk_dollars: f64,
    stop_distance_points: f64,
    point_value: f64,
) -> SizedPosition {
    let base = base_quantity.max(0);
    let risk_per_unit = stop_distance_points.max(0.0) * point_value.max(0.0);

    let final_quantity = if max_risk_dollars > 0.0 && risk_per_unit > 0.0 {
        let cap = (max_risk_dollars / risk_per_unit).floor() as i64;
        let capped = base.min(cap);
        if base >= 1 {
            capped.max(1)
        } else {
            0
        }
    } else {
        base
    };

    SizedPosition {
        final_quantity,
        risk_per_unit,
        total_risk: final_quantity as f64 * risk_per_unit,
    }
}

/// Stop distance derived from the volatility estimate, clamped to the
/// configured bounds.
pub fn watr_stop_distance(watr: f64, stop_multiplier: f64, min_stop: f64, max_stop: f64) -> f64 {
    let lo = min_stop.min(max_stop).max(0.0);
    let hi = min_stop.max(max_stop).max(lo);
    (watr.max(0.0) * stop_multiplier.max(0.0)).clamp(lo, hi)
}

/// WATR-driven variant: derive the stop distance from volatility, then
/// delegate to [`size`].
pub fn size_with_watr(
    base_quantity: i64,
    max_risk_dollars: f64,
    watr: f64,
    stop_multiplier: f64,
    min_stop: f64,
    max_stop: f64,
    point_value: f64,
) -> SizedPosition {
    let stop_distance = watr_stop_distance(watr, stop_multiplier, min_stop, max_stop);
    size(base_quantity, max_risk_dollars, stop_distance, point_value)
}
