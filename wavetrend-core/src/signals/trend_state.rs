//! Hysteretic long/short/flat state machine.
//!
//! Inputs each bar: trend slope (difference of consecutive trend values) and
//! the momentum oscillator, against two thresholds. Events fire only on
//! transitions: entering from flat, exiting to flat, or a reversal, which
//! emits the exit followed by the entry in the same evaluation. Re-affirming
//! the current state emits nothing — the machine keeps exactly one bar of
//! history.

use serde::{Deserialize, Serialize};

/// Current signal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendState {
    Flat,
    Long,
    Short,
}

/// A state transition. Reversals produce an exit event immediately followed
/// by an entry event; both sides are never simultaneously active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendEvent {
    EnterLong,
    EnterShort,
    ExitLong,
    ExitShort,
}

#[derive(Debug, Clone, Default)]
pub struct TrendSignalStateMachine {
    long_active: bool,
    short_active: bool,
}

impl TrendSignalStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> TrendState {
        match (self.long_active, self.short_active) {
            (true, _) => TrendState::Long,
            (_, true) => TrendState::Short,
            _ => TrendState::Flat,
        }
    }

    /// Evaluate one bar. Returns the transitions in emission order.
    pub fn evaluate(
        &mut self,
        slope: f64,
        momentum: f64,
        min_slope: f64,
        momentum_threshold: f64,
    ) -> Vec<TrendEvent> {
        let long_condition = slope > min_slope && momentum > momentum_threshold;
        let short_condition = slope < -min_slope && momentum < -momentum_threshold;

        let mut events = Vec::new();
        if self.long_active {
            if short_condition {
                events.push(TrendEvent::ExitLong);
                events.push(TrendEvent::EnterShort);
                self.long_active = false;
                self.short_active = true;
            } else if !long_condition {
                events.push(TrendEvent::ExitLong);
                self.long_active = false;
            }
        } else if self.short_active {
            if long_condition {
                events.push(TrendEvent::ExitShort);
                events.push(TrendEvent::EnterLong);
                self.short_active = false;
                self.long_active = true;
            } else if !short_condition {
                events.push(TrendEvent::ExitShort);
                self.short_active = false;
            }
        } else if long_condition {
            events.push(TrendEvent::EnterLong);
            self.long_active = true;
        } else if short_condition {
            events.push(TrendEvent::EnterShort);
            self.short_active = true;
        }
        events
    }

    /// Forget the held state. Called on any transform configuration change.
    pub fn reset(&mut self) {
        self.long_active = false;
        self.short_active = false;
    }
}
