//! End-to-end engine tests: state machine events drive the position
//! manager, brackets go out through the gateway, fills come back on the
//! callback path.

use parking_lot::Mutex;
use std::sync::Arc;

use wavetrend_core::domain::{Fill, Order, OrderId, OrderKind, OrderSide, PositionSide};
use wavetrend_core::engine::{BarOutput, Engine, EngineConfig};
use wavetrend_core::host::{CalcContext, OrderGateway};
use wavetrend_core::orders::OrderRole;
use wavetrend_core::position_management::PositionManager;
use wavetrend_core::signals::{TrendEvent, TrendSignalStateMachine};
use wavetrend_core::wavelet::TransformRegistry;

#[derive(Default)]
struct RecordingGateway {
    submitted: Mutex<Vec<Order>>,
    cancelled: Mutex<Vec<OrderId>>,
    closes: Mutex<Vec<(OrderSide, i64)>>,
}

impl OrderGateway for RecordingGateway {
    fn submit(&self, orders: &[Order]) {
        self.submitted.lock().extend_from_slice(orders);
    }
    fn cancel(&self, id: &OrderId) {
        self.cancelled.lock().push(id.clone());
    }
    fn close_at_market(&self, _instrument: &str, side: OrderSide, quantity: i64) {
        self.closes.lock().push((side, quantity));
    }
}

struct VecContext {
    prices: Vec<f64>,
    outputs: Vec<(i64, BarOutput)>,
}

impl VecContext {
    fn new(prices: Vec<f64>) -> Self {
        Self {
            prices,
            outputs: Vec::new(),
        }
    }
}

impl CalcContext for VecContext {
    fn close(&self, bar_index: i64) -> Option<f64> {
        if bar_index < 0 {
            None
        } else {
            self.prices.get(bar_index as usize).copied()
        }
    }
    fn emit(&mut self, bar_index: i64, output: BarOutput) {
        self.outputs.push((bar_index, output));
    }
}

/// Route state-machine events into the manager the way the engine does.
fn apply_events(
    manager: &PositionManager,
    events: &[TrendEvent],
    price: f64,
    stop_distance: f64,
    quantity: i64,
) {
    for event in events {
        match event {
            TrendEvent::ExitLong | TrendEvent::ExitShort => {
                manager.exit(price);
            }
            TrendEvent::EnterLong => {
                manager.enter(
                    PositionSide::Long,
                    price,
                    price - stop_distance,
                    price + 2.0 * stop_distance,
                    quantity,
                );
            }
            TrendEvent::EnterShort => {
                manager.enter(
                    PositionSide::Short,
                    price,
                    price + stop_distance,
                    price - 2.0 * stop_distance,
                    quantity,
                );
            }
        }
    }
}

#[test]
fn continuous_condition_yields_one_entry_and_one_exit() {
    let gateway = Arc::new(RecordingGateway::default());
    let manager = PositionManager::new("ES", 50.0, gateway.clone());
    let mut machine = TrendSignalStateMachine::new();

    // Flat → long condition held for three bars → flat.
    let bars = [
        (0.0, 0.0),
        (2.0, 15.0),
        (2.5, 18.0),
        (2.2, 16.0),
        (0.1, 1.0),
        (0.1, 1.0),
    ];
    for (slope, momentum) in bars {
        let events = machine.evaluate(slope, momentum, 1.0, 10.0);
        apply_events(&manager, &events, 100.0, 2.0, 1);
    }

    // Exactly one bracket out, exactly one close back.
    assert_eq!(gateway.submitted.lock().len(), 3);
    assert_eq!(gateway.closes.lock().len(), 1);
    assert!(!manager.is_open());
}

#[test]
fn reversal_closes_long_and_opens_short_only() {
    let gateway = Arc::new(RecordingGateway::default());
    let manager = PositionManager::new("ES", 50.0, gateway.clone());
    let mut machine = TrendSignalStateMachine::new();

    let events = machine.evaluate(2.0, 15.0, 1.0, 10.0);
    apply_events(&manager, &events, 100.0, 2.0, 1);
    assert_eq!(manager.side(), Some(PositionSide::Long));

    let events = machine.evaluate(-2.0, -15.0, 1.0, 10.0);
    assert_eq!(events, vec![TrendEvent::ExitLong, TrendEvent::EnterShort]);
    apply_events(&manager, &events, 99.0, 2.0, 1);

    // One close for the long; the tracked position is the short side only.
    assert_eq!(gateway.closes.lock().len(), 1);
    assert_eq!(manager.side(), Some(PositionSide::Short));
    assert_eq!(gateway.submitted.lock().len(), 6);

    let position = manager.position().unwrap();
    assert_eq!(position.side, PositionSide::Short);
    assert_eq!(position.entry_price, 99.0);
    assert_eq!(position.stop_price, 101.0);
}

#[test]
fn engine_trades_a_trend_reversal_end_to_end() {
    let config = EngineConfig {
        window_length: 16,
        levels: 3,
        watr_levels: 2,
        watr_period: 8,
        momentum_window: 8,
        min_stop: 0.5,
        base_quantity: 2,
        ..EngineConfig::default()
    };

    let gateway = Arc::new(RecordingGateway::default());
    let manager = Arc::new(PositionManager::new("ES", config.point_value, gateway.clone()));
    let engine = Engine::new(
        config,
        Arc::new(TransformRegistry::with_defaults()),
        manager.clone(),
    );

    // Strong rise, then a strong decline.
    let mut prices: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 0.8).collect();
    let peak = *prices.last().unwrap();
    prices.extend((1..60).map(|i| peak - i as f64 * 0.8));

    let mut ctx = VecContext::new(prices.clone());
    for bar in 0..prices.len() as i64 {
        engine.calculate(bar, &mut ctx).unwrap();
    }

    // The rise produced a long entry, the decline at least one exit and a
    // short entry: two brackets and one market close minimum.
    let submitted_count = gateway.submitted.lock().len();
    assert!(submitted_count >= 6, "submitted: {submitted_count}");
    assert!(!gateway.closes.lock().is_empty());
    assert_eq!(manager.side(), Some(PositionSide::Short));

    // Emitted outputs agree with the tracked side on the final bar.
    let last = &ctx.outputs.last().unwrap().1;
    assert!(last.short_active);
    assert!(!last.long_active);
    assert!(last.slope < 0.0);
    assert!(last.momentum < 0.0);
    assert!(last.watr > 0.0);
}

#[test]
fn engine_routes_fills_into_the_tracker() {
    let config = EngineConfig {
        window_length: 16,
        levels: 3,
        watr_levels: 2,
        min_stop: 0.5,
        base_quantity: 2,
        ..EngineConfig::default()
    };
    let gateway = Arc::new(RecordingGateway::default());
    let manager = Arc::new(PositionManager::new("ES", config.point_value, gateway.clone()));
    let engine = Engine::new(
        config,
        Arc::new(TransformRegistry::with_defaults()),
        manager.clone(),
    );

    let prices: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 0.8).collect();
    let mut ctx = VecContext::new(prices);
    for bar in 0..40 {
        engine.calculate(bar, &mut ctx).unwrap();
    }
    assert_eq!(manager.side(), Some(PositionSide::Long));

    // Entry fill refines the tracked entry price.
    let entry_id = manager.order_id_for(OrderRole::Market, "entry").unwrap();
    engine.positions().on_order_filled(&Fill {
        order_id: entry_id,
        price: 112.25,
        quantity: 2,
    });
    assert_eq!(manager.position().unwrap().entry_price, 112.25);

    // Stop fill for the whole quantity flattens and cancels the sibling.
    let stop_id = manager.order_id_for(OrderRole::Stop, "stop").unwrap();
    engine.positions().on_order_filled(&Fill {
        order_id: stop_id,
        price: 110.0,
        quantity: 2,
    });
    assert!(!manager.is_open());
    assert_eq!(manager.active_order_count(), 0);
}

#[test]
fn submitted_bracket_is_market_stop_limit() {
    let gateway = Arc::new(RecordingGateway::default());
    let manager = PositionManager::new("NQ", 20.0, gateway.clone());
    manager.enter(PositionSide::Long, 15_000.0, 14_950.0, 15_100.0, 1);

    let submitted = gateway.submitted.lock();
    assert_eq!(submitted.len(), 3);
    assert!(matches!(submitted[0].kind, OrderKind::Market));
    assert!(matches!(submitted[1].kind, OrderKind::Stop { .. }));
    assert!(matches!(submitted[2].kind, OrderKind::Limit { .. }));
    // Protective legs trade opposite to the entry.
    assert_eq!(submitted[0].side, OrderSide::Buy);
    assert_eq!(submitted[1].side, OrderSide::Sell);
    assert_eq!(submitted[2].side, OrderSide::Sell);
}
