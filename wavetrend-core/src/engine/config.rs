//! Engine configuration: one typed snapshot, installed whole.
//!
//! The host builds an `EngineConfig` from its settings surface and installs
//! it atomically; the calculation path never does per-key string lookups.
//! Invalid values normalize to documented defaults with a warning instead of
//! halting calculation. A blake3 fingerprint of the canonical serialization
//! detects configuration changes and drives the derived-state reset.

use crate::indicators::MomentumMode;
use crate::wavelet::{ShrinkageRule, ThresholdMethod, WaveletKey};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Everything the core recognizes from the host's settings surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Rolling price window length in bars.
    pub window_length: usize,
    /// Decomposition depth.
    pub levels: usize,
    pub wavelet: WaveletKey,
    pub threshold_method: ThresholdMethod,
    pub shrinkage: ShrinkageRule,

    /// Per-level sample window for the momentum statistic.
    pub momentum_window: usize,
    pub momentum_alpha: f64,
    pub momentum_scaling: f64,
    pub momentum_mode: MomentumMode,

    /// Hyperbolic discount applied to coarser levels (momentum and WATR).
    pub level_decay: f64,

    /// Entry requires slope beyond this, in points per bar.
    pub min_slope: f64,
    /// Entry requires smoothed momentum beyond this.
    pub momentum_threshold: f64,

    pub watr_period: usize,
    /// How many (finest) levels feed the volatility estimate.
    pub watr_levels: usize,
    pub watr_multiplier: f64,

    /// Dollar risk cap per trade; 0 disables the cap.
    pub max_risk_dollars: f64,
    pub base_quantity: i64,
    pub point_value: f64,
    pub stop_multiplier: f64,
    pub target_multiplier: f64,
    pub min_stop: f64,
    pub max_stop: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_length: 256,
            levels: 4,
            wavelet: WaveletKey::Db4,
            threshold_method: ThresholdMethod::Universal,
            shrinkage: ShrinkageRule::Soft,
            momentum_window: 16,
            momentum_alpha: 0.2,
            momentum_scaling: 100.0,
            momentum_mode: MomentumMode::Sum,
            level_decay: 0.5,
            min_slope: 0.0,
            momentum_threshold: 0.0,
            watr_period: 14,
            watr_levels: 2,
            watr_multiplier: 2.0,
            max_risk_dollars: 0.0,
            base_quantity: 1,
            point_value: 1.0,
            stop_multiplier: 2.0,
            target_multiplier: 3.0,
            min_stop: 0.0,
            max_stop: f64::MAX,
        }
    }
}

impl EngineConfig {
    /// Replace unusable values with defaults, warning once per field.
    /// Calculation always runs on a normalized snapshot.
    pub fn normalized(mut self) -> Self {
        let defaults = Self::default();

        if self.window_length == 0 {
            warn!("window_length 0 is invalid, using {}", defaults.window_length);
            self.window_length = defaults.window_length;
        }
        if self.levels == 0 || self.levels > 16 {
            warn!(levels = self.levels, "decomposition levels out of range, using {}", defaults.levels);
            self.levels = defaults.levels;
        }
        if self.momentum_window == 0 {
            warn!("momentum_window 0 is invalid, using {}", defaults.momentum_window);
            self.momentum_window = defaults.momentum_window;
        }
        if !(self.momentum_alpha > 0.0 && self.momentum_alpha <= 1.0) {
            warn!(alpha = self.momentum_alpha, "momentum_alpha outside (0, 1], using {}", defaults.momentum_alpha);
            self.momentum_alpha = defaults.momentum_alpha;
        }
        if self.momentum_scaling <= 0.0 || !self.momentum_scaling.is_finite() {
            warn!(scaling = self.momentum_scaling, "momentum_scaling must be positive, using {}", defaults.momentum_scaling);
            self.momentum_scaling = defaults.momentum_scaling;
        }
        if self.level_decay < 0.0 {
            warn!(decay = self.level_decay, "level_decay must be >= 0, using {}", defaults.level_decay);
            self.level_decay = defaults.level_decay;
        }
        if self.min_slope < 0.0 {
            self.min_slope = 0.0;
        }
        if self.momentum_threshold < 0.0 {
            self.momentum_threshold = 0.0;
        }
        if self.watr_period == 0 {
            warn!("watr_period 0 is invalid, using {}", defaults.watr_period);
            self.watr_period = defaults.watr_period;
        }
        if self.watr_levels == 0 || self.watr_levels > self.levels {
            let clamped = self.watr_levels.clamp(1, self.levels);
            warn!(watr_levels = self.watr_levels, "watr_levels outside 1..=levels, using {clamped}");
            self.watr_levels = clamped;
        }
        if self.point_value <= 0.0 {
            warn!(point_value = self.point_value, "point_value must be positive, using {}", defaults.point_value);
            self.point_value = defaults.point_value;
        }
        if self.base_quantity < 0 {
            self.base_quantity = 0;
        }
        if self.stop_multiplier <= 0.0 {
            warn!("stop_multiplier must be positive, using {}", defaults.stop_multiplier);
            self.stop_multiplier = defaults.stop_multiplier;
        }
        if self.target_multiplier <= 0.0 {
            warn!("target_multiplier must be positive, using {}", defaults.target_multiplier);
            self.target_multiplier = defaults.target_multiplier;
        }
        self
    }

    /// Stable identity of this snapshot. Two configs compare equal exactly
    /// when every recognized option matches.
    pub fn fingerprint(&self) -> ConfigFingerprint {
        let json = serde_json::to_string(self).expect("EngineConfig must serialize");
        ConfigFingerprint(blake3::hash(json.as_bytes()).to_hex().to_string())
    }
}

/// blake3 hash of the canonical config serialization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFingerprint(String);
