//! Per-bar orchestration.
//!
//! One `Engine` instance serves one instrument. The host calls
//! [`Engine::calculate`] once per bar (or per tick, with an unchanged bar
//! index); the engine advances the price window, runs the transform,
//! momentum, shrinkage, and volatility stages, feeds the signal state
//! machine, and routes its transition events into the position manager.
//!
//! All derived per-instrument state lives behind a single lock, so a bar is
//! processed as one critical section and concurrent readers never observe a
//! half-updated window or oscillator. The installed configuration is an
//! atomically replaced snapshot; a fingerprint comparison at the top of each
//! bar resets derived state exactly once after any change, before the bar is
//! processed.

pub mod config;
pub mod outputs;

pub use config::{ConfigFingerprint, EngineConfig};
pub use outputs::BarOutput;

use crate::data::{PriceWindowBuffer, WindowError};
use crate::domain::PositionSide;
use crate::host::CalcContext;
use crate::indicators::{MomentumOscillator, Watr};
use crate::position_management::PositionManager;
use crate::signals::{TrendEvent, TrendSignalStateMachine, TrendState};
use crate::sizers::{size, watr_stop_distance};
use crate::wavelet::{shrink, threshold, MultiResTransform, TransformRegistry};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Window(#[from] WindowError),
}

/// Everything that must reset together on a configuration change.
struct CalcState {
    window: PriceWindowBuffer,
    momentum: MomentumOscillator,
    watr: Watr,
    signal: TrendSignalStateMachine,
    transform: Box<dyn MultiResTransform>,
    fingerprint: ConfigFingerprint,
}

impl CalcState {
    fn build(config: &EngineConfig, registry: &TransformRegistry) -> Self {
        Self {
            window: PriceWindowBuffer::new(),
            momentum: MomentumOscillator::new(
                config.momentum_window,
                config.level_decay,
                config.momentum_scaling,
                config.momentum_alpha,
                config.momentum_mode,
            ),
            watr: Watr::new(config.watr_period, config.level_decay),
            signal: TrendSignalStateMachine::new(),
            transform: registry.resolve(config.wavelet),
            fingerprint: config.fingerprint(),
        }
    }
}

pub struct Engine {
    config: RwLock<Arc<EngineConfig>>,
    registry: Arc<TransformRegistry>,
    state: Mutex<CalcState>,
    positions: Arc<PositionManager>,
}

impl Engine {
    pub fn new(
        config: EngineConfig,
        registry: Arc<TransformRegistry>,
        positions: Arc<PositionManager>,
    ) -> Self {
        let config = config.normalized();
        let state = CalcState::build(&config, &registry);
        Self {
            config: RwLock::new(Arc::new(config)),
            registry,
            state: Mutex::new(state),
            positions,
        }
    }

    /// Install a new configuration snapshot. It is built completely before
    /// being swapped in, so a concurrently running bar sees either the old
    /// or the new snapshot, never a mix. Derived state resets at the start
    /// of the next bar.
    pub fn set_config(&self, config: EngineConfig) {
        *self.config.write() = Arc::new(config.normalized());
    }

    pub fn config(&self) -> Arc<EngineConfig> {
        self.config.read().clone()
    }

    pub fn positions(&self) -> &Arc<PositionManager> {
        &self.positions
    }

    /// Process one bar. A failure leaves all derived state untouched for the
    /// next bar; the caller logs and skips.
    pub fn calculate(&self, bar_index: i64, ctx: &mut dyn CalcContext) -> Result<(), EngineError> {
        let config = self.config.read().clone();
        let mut state = self.state.lock();

        let fingerprint = config.fingerprint();
        if state.fingerprint != fingerprint {
            info!("configuration changed, resetting derived state");
            *state = CalcState::build(&config, &self.registry);
        }

        // Insufficient history: emit nothing rather than compute on a
        // short or padded window.
        if bar_index + 1 < config.window_length as i64 {
            return Ok(());
        }

        let prices = state
            .window
            .update(bar_index, config.window_length, |i| ctx.close(i))?;

        let mut decomposition = state.transform.forward(&prices, config.levels);
        // Momentum reads the coefficients before shrinkage mutates them.
        let unshrunk = decomposition.details.clone();

        let momentum = state.momentum.calculate(&unshrunk, config.levels);
        let momentum_raw = state.momentum.raw();

        for (level, coeffs) in decomposition.details.iter_mut().enumerate() {
            let t = threshold(coeffs, config.threshold_method, level + 1);
            shrink(coeffs, t, config.shrinkage);
        }

        let watr = state.watr.calculate(&decomposition.details, config.watr_levels);

        let trend_series = state.transform.inverse(&decomposition);
        let trend = trend_series.last().copied().unwrap_or(0.0);
        let slope = if trend_series.len() >= 2 {
            trend - trend_series[trend_series.len() - 2]
        } else {
            0.0
        };

        let events =
            state
                .signal
                .evaluate(slope, momentum, config.min_slope, config.momentum_threshold);
        let signal_state = state.signal.state();

        let detail_signs: Vec<i8> = unshrunk
            .iter()
            .map(|level| {
                level.last().map_or(0, |c| {
                    if *c > 0.0 {
                        1
                    } else if *c < 0.0 {
                        -1
                    } else {
                        0
                    }
                })
            })
            .collect();

        let (watr_lower, watr_upper) = state.watr.bands(trend, config.watr_multiplier);
        let price = prices.last().copied().unwrap_or(0.0);

        // Order routing happens outside the calc-state critical section;
        // the position manager has its own synchronization.
        drop(state);

        for event in events {
            self.apply_event(event, price, watr, &config);
        }

        ctx.emit(
            bar_index,
            BarOutput {
                trend,
                slope,
                momentum_raw,
                momentum,
                detail_signs,
                watr,
                watr_upper,
                watr_lower,
                long_active: signal_state == TrendState::Long,
                short_active: signal_state == TrendState::Short,
            },
        );
        Ok(())
    }

    fn apply_event(&self, event: TrendEvent, price: f64, watr: f64, config: &EngineConfig) {
        match event {
            TrendEvent::ExitLong | TrendEvent::ExitShort => {
                self.positions.exit(price);
            }
            TrendEvent::EnterLong => self.enter(PositionSide::Long, price, watr, config),
            TrendEvent::EnterShort => self.enter(PositionSide::Short, price, watr, config),
        }
    }

    fn enter(&self, side: PositionSide, price: f64, watr: f64, config: &EngineConfig) {
        let stop_distance =
            watr_stop_distance(watr, config.stop_multiplier, config.min_stop, config.max_stop);
        if stop_distance <= 0.0 {
            debug!(?side, "entry skipped: no usable stop distance");
            return;
        }

        let sized = size(
            config.base_quantity,
            config.max_risk_dollars,
            stop_distance,
            config.point_value,
        );
        if sized.final_quantity <= 0 {
            debug!(?side, "entry skipped: sized to zero");
            return;
        }

        let target_distance = (watr * config.target_multiplier).max(stop_distance);
        let (stop_price, target_price) = match side {
            PositionSide::Long => (price - stop_distance, price + target_distance),
            PositionSide::Short => (price + stop_distance, price - target_distance),
        };
        self.positions
            .enter(side, price, stop_price, target_price, sized.final_quantity);
    }
}
