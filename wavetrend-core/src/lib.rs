//! WaveTrend Core — multiresolution trend/momentum signal engine.
//!
//! This crate contains the signal-processing-and-execution core:
//! - Rolling price window with O(shift) incremental update
//! - Transform seam (decomposition containers, init-time wavelet registry)
//! - Adaptive coefficient shrinkage (Universal / BayesShrink / SURE)
//! - Level-weighted volatility (WATR) and momentum oscillators
//! - Hysteretic long/short/flat state machine, transition events only
//! - Risk-capped sizing, bracket order bundles, position tracking
//! - Per-bar engine orchestration with fingerprint-driven config resets
//!
//! The host platform sits behind the small traits in [`host`]; chart
//! rendering, settings UI, and the concrete transform filter banks live
//! outside this crate.

pub mod data;
pub mod domain;
pub mod engine;
pub mod host;
pub mod indicators;
pub mod orders;
pub mod position_management;
pub mod signals;
pub mod sizers;
pub mod wavelet;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: shared engine types are Send + Sync.
    ///
    /// The host may run calculation from a worker pool while fills arrive on
    /// other threads; if any of these types loses thread safety, the build
    /// breaks here instead of at an integration boundary.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Order>();
        require_sync::<domain::Order>();
        require_send::<domain::Fill>();
        require_sync::<domain::Fill>();
        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::TradeRecord>();
        require_sync::<domain::TradeRecord>();
        require_send::<domain::OrderId>();
        require_sync::<domain::OrderId>();
        require_send::<domain::IdGen>();
        require_sync::<domain::IdGen>();

        // Per-instrument state holders
        require_send::<data::PriceWindowBuffer>();
        require_sync::<data::PriceWindowBuffer>();
        require_send::<indicators::Watr>();
        require_sync::<indicators::Watr>();
        require_send::<indicators::MomentumOscillator>();
        require_sync::<indicators::MomentumOscillator>();
        require_send::<signals::TrendSignalStateMachine>();
        require_sync::<signals::TrendSignalStateMachine>();

        // Order bookkeeping and orchestration
        require_send::<orders::OrderBundle>();
        require_sync::<orders::OrderBundle>();
        require_send::<position_management::PositionTracker>();
        require_sync::<position_management::PositionTracker>();
        require_send::<position_management::PositionManager>();
        require_sync::<position_management::PositionManager>();

        // Engine surface
        require_send::<engine::EngineConfig>();
        require_sync::<engine::EngineConfig>();
        require_send::<engine::BarOutput>();
        require_sync::<engine::BarOutput>();
        require_send::<engine::Engine>();
        require_sync::<engine::Engine>();

        // Transform seam
        require_send::<wavelet::Decomposition>();
        require_sync::<wavelet::Decomposition>();
        require_send::<wavelet::TransformRegistry>();
        require_sync::<wavelet::TransformRegistry>();
    }
}
