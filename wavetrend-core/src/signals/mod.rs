//! Trend-signal state machine: slope + momentum in, transition events out.

pub mod trend_state;

pub use trend_state::{TrendEvent, TrendSignalStateMachine, TrendState};
