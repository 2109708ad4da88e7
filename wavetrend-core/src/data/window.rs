//! Rolling price window with O(shift) incremental update.
//!
//! The buffer tracks the most recent `window_length` closes ending at the
//! current bar. Advancing by `s` bars left-rotates the existing samples and
//! fetches only the `s` new prices; anything that invalidates the incremental
//! path (first use, a start that moved backwards, a jump wider than the
//! window, a length change) falls back to a full refresh. Both paths produce
//! identical contents for the same target window.
//!
//! Missing or non-finite prices are forward-filled from the last valid close
//! (0.0 if none has ever been seen). Callers receive a copy, never a view of
//! the internal buffer.

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum WindowError {
    #[error("window length must be at least 1, got {0}")]
    InvalidLength(usize),
}

#[derive(Debug, Clone)]
pub struct PriceWindowBuffer {
    prices: Vec<f64>,
    /// Bar index of `prices[0]`.
    start_index: i64,
    last_valid: f64,
    seen_valid: bool,
    initialized: bool,
}

impl PriceWindowBuffer {
    pub fn new() -> Self {
        Self {
            prices: Vec::new(),
            start_index: 0,
            last_valid: 0.0,
            seen_valid: false,
            initialized: false,
        }
    }

    /// Bar index of the oldest sample, once initialized.
    pub fn start_index(&self) -> i64 {
        self.start_index
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Advance the window so it ends at `new_bar_index` and return a copy.
    ///
    /// `shift == 0` (a mid-bar tick on the same bar) only overwrites the last
    /// element with the latest price.
    pub fn update(
        &mut self,
        new_bar_index: i64,
        window_length: usize,
        mut lookup: impl FnMut(i64) -> Option<f64>,
    ) -> Result<Vec<f64>, WindowError> {
        if window_length == 0 {
            return Err(WindowError::InvalidLength(window_length));
        }

        let target_start = new_bar_index - window_length as i64 + 1;

        let shift = target_start - self.start_index;
        let incremental = self.initialized
            && self.prices.len() == window_length
            && shift >= 0
            && (shift as usize) <= window_length;

        if !incremental {
            self.refresh(target_start, window_length, &mut lookup);
        } else if shift == 0 {
            let price = self.fetch(new_bar_index, &mut lookup);
            if let Some(last) = self.prices.last_mut() {
                *last = price;
            }
        } else {
            let shift = shift as usize;
            self.prices.rotate_left(shift);
            for offset in 0..shift {
                let bar = new_bar_index - (shift - 1 - offset) as i64;
                let price = self.fetch(bar, &mut lookup);
                self.prices[window_length - shift + offset] = price;
            }
            self.start_index = target_start;
        }

        Ok(self.prices.clone())
    }

    /// Drop all samples; the next update performs a full refresh.
    pub fn reset(&mut self) {
        self.prices.clear();
        self.start_index = 0;
        self.last_valid = 0.0;
        self.seen_valid = false;
        self.initialized = false;
    }

    fn refresh(
        &mut self,
        target_start: i64,
        window_length: usize,
        lookup: &mut impl FnMut(i64) -> Option<f64>,
    ) {
        self.prices.clear();
        self.prices.reserve(window_length);
        for bar in target_start..target_start + window_length as i64 {
            let price = self.fetch(bar, lookup);
            self.prices.push(price);
        }
        self.start_index = target_start;
        self.initialized = true;
    }

    fn fetch(&mut self, bar: i64, lookup: &mut impl FnMut(i64) -> Option<f64>) -> f64 {
        match lookup(bar).filter(|p| p.is_finite()) {
            Some(price) => {
                self.last_valid = price;
                self.seen_valid = true;
                price
            }
            None => {
                debug!(bar, "missing price, forward-filling");
                if self.seen_valid {
                    self.last_valid
                } else {
                    0.0
                }
            }
        }
    }
}

impl Default for PriceWindowBuffer {
    fn default() -> Self {
        Self::new()
    }
}
