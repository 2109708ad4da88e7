//! Transform seam: coefficient containers, the transform trait, and the
//! init-time registry.
//!
//! Transforms are resolved once when a configuration is installed, never per
//! bar, and never by reflection: hosts register constructors under a
//! validated [`WaveletKey`]. An unregistered key falls back to the built-in
//! [`AtrousCascade`] with a warning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::warn;

/// One bar's decomposition: an approximation array plus one detail array per
/// level, all of window length. Owned exclusively by the calculation that
/// produced them and discarded after the bar.
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    pub approximation: Vec<f64>,
    /// `details[0]` is the finest scale.
    pub details: Vec<Vec<f64>>,
}

impl Decomposition {
    pub fn levels(&self) -> usize {
        self.details.len()
    }
}

/// Forward/inverse multiresolution decomposition over price arrays.
///
/// Pure over its inputs: no internal state, safe to call from any
/// calculation thread.
pub trait MultiResTransform: Send + Sync {
    fn name(&self) -> &str;

    /// Decompose `prices` into an approximation plus `levels` detail arrays,
    /// each the same length as the input.
    fn forward(&self, prices: &[f64], levels: usize) -> Decomposition;

    /// Reconstruct a series from (possibly shrunk) coefficients.
    fn inverse(&self, decomposition: &Decomposition) -> Vec<f64>;
}

/// Wavelet families recognized in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaveletKey {
    Haar,
    Db4,
    Sym8,
}

impl WaveletKey {
    /// Parse a configuration string. Unrecognized names fall back to `Db4`
    /// with a warning rather than halting calculation.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "haar" => Self::Haar,
            "db4" | "daubechies4" => Self::Db4,
            "sym8" | "symlet8" => Self::Sym8,
            other => {
                warn!(wavelet = other, "unrecognized wavelet, using db4");
                Self::Db4
            }
        }
    }
}

impl Default for WaveletKey {
    fn default() -> Self {
        Self::Db4
    }
}

type TransformCtor = Box<dyn Fn() -> Box<dyn MultiResTransform> + Send + Sync>;

/// Maps wavelet keys to transform constructors, resolved at configuration
/// load.
pub struct TransformRegistry {
    constructors: HashMap<WaveletKey, TransformCtor>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Registry with the built-in cascade under every key. Hosts overwrite
    /// the keys they have real filter banks for.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for key in [WaveletKey::Haar, WaveletKey::Db4, WaveletKey::Sym8] {
            registry.register(key, || Box::new(AtrousCascade::new()));
        }
        registry
    }

    pub fn register<F>(&mut self, key: WaveletKey, constructor: F)
    where
        F: Fn() -> Box<dyn MultiResTransform> + Send + Sync + 'static,
    {
        self.constructors.insert(key, Box::new(constructor));
    }

    pub fn contains(&self, key: WaveletKey) -> bool {
        self.constructors.contains_key(&key)
    }

    /// Construct the transform for `key`, falling back to the built-in
    /// cascade when nothing is registered for it.
    pub fn resolve(&self, key: WaveletKey) -> Box<dyn MultiResTransform> {
        match self.constructors.get(&key) {
            Some(ctor) => ctor(),
            None => {
                warn!(?key, "no transform registered, using built-in cascade");
                Box::new(AtrousCascade::new())
            }
        }
    }
}

impl Default for TransformRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Built-in undecimated (à trous) Haar cascade.
///
/// Causal and length-preserving: level `j` averages samples `2^j` apart,
/// details are the residual between successive smoothings, and the inverse is
/// the exact additive reconstruction `approximation + Σ details`. Serves as
/// the default transform and as the fallback when a host filter bank is not
/// registered.
#[derive(Debug, Clone, Default)]
pub struct AtrousCascade;

impl AtrousCascade {
    pub fn new() -> Self {
        Self
    }
}

impl MultiResTransform for AtrousCascade {
    fn name(&self) -> &str {
        "atrous-haar"
    }

    fn forward(&self, prices: &[f64], levels: usize) -> Decomposition {
        let n = prices.len();
        let mut approximation = prices.to_vec();
        let mut details = Vec::with_capacity(levels);

        for level in 0..levels {
            let stride = 1usize << level;
            let mut next = vec![0.0; n];
            for i in 0..n {
                let lagged = approximation[i.saturating_sub(stride)];
                next[i] = 0.5 * (approximation[i] + lagged);
            }
            let detail: Vec<f64> = approximation
                .iter()
                .zip(&next)
                .map(|(a, s)| a - s)
                .collect();
            details.push(detail);
            approximation = next;
        }

        Decomposition {
            approximation,
            details,
        }
    }

    fn inverse(&self, decomposition: &Decomposition) -> Vec<f64> {
        let mut series = decomposition.approximation.clone();
        for detail in &decomposition.details {
            for (s, d) in series.iter_mut().zip(detail) {
                *s += d;
            }
        }
        series
    }
}
