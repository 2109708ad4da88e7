//! Entry, exit, and reversal orchestration.
//!
//! The manager owns the tracker and the order bundle for the lifetime of one
//! open trade, talks to the host only through the [`OrderGateway`] seam, and
//! never lets both sides be tracked as open at once: a reversal closes the
//! old side before the new entry is built.

use crate::domain::{Fill, IdGen, Order, OrderId, OrderKind, OrderSide, Position, PositionSide, TradeRecord};
use crate::host::OrderGateway;
use crate::orders::{OrderBundle, OrderRole};
use crate::position_management::tracker::PositionTracker;
use chrono::Utc;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct PositionManager {
    instrument: String,
    point_value: f64,
    gateway: Arc<dyn OrderGateway>,
    tracker: PositionTracker,
    bundle: Mutex<OrderBundle>,
    ids: IdGen,
}

impl PositionManager {
    pub fn new(instrument: impl Into<String>, point_value: f64, gateway: Arc<dyn OrderGateway>) -> Self {
        Self {
            instrument: instrument.into(),
            point_value: if point_value > 0.0 { point_value } else { 1.0 },
            gateway,
            tracker: PositionTracker::new(),
            bundle: Mutex::new(OrderBundle::new()),
            ids: IdGen::new(),
        }
    }

    /// Open a bracket: market entry plus protective stop and target on the
    /// opposite side. Rejected (logged, no state change) when a position is
    /// already open or the inputs are unusable.
    pub fn enter(
        &self,
        side: PositionSide,
        entry_price: f64,
        stop_price: f64,
        target_price: f64,
        quantity: i64,
    ) -> bool {
        if quantity <= 0 {
            warn!(quantity, "entry rejected: non-positive quantity");
            return false;
        }
        if ![entry_price, stop_price, target_price]
            .iter()
            .all(|p| p.is_finite() && *p > 0.0)
        {
            warn!(entry_price, stop_price, target_price, "entry rejected: bad prices");
            return false;
        }
        if self.tracker.is_open() {
            warn!(?side, "entry rejected: position already open");
            return false;
        }

        let entry_side = match side {
            PositionSide::Long => OrderSide::Buy,
            PositionSide::Short => OrderSide::Sell,
        };
        let exit_side = entry_side.opposite();

        let market = Order::new(
            self.ids.next_id("entry"),
            self.instrument.clone(),
            entry_side,
            OrderKind::Market,
            quantity,
        );
        let stop = Order::new(
            self.ids.next_id("stop"),
            self.instrument.clone(),
            exit_side,
            OrderKind::Stop {
                trigger_price: stop_price,
            },
            quantity,
        );
        let target = Order::new(
            self.ids.next_id("target"),
            self.instrument.clone(),
            exit_side,
            OrderKind::Limit {
                limit_price: target_price,
            },
            quantity,
        );

        let submitted = [market.clone(), stop.clone(), target.clone()];
        {
            let mut bundle = self.bundle.lock();
            bundle.clear();
            // Tags are stable per role; ids are unique per order, so a
            // freshly cleared bundle accepts the whole bracket.
            for (role, tag, order) in [
                (OrderRole::Market, "entry", market),
                (OrderRole::Stop, "stop", stop),
                (OrderRole::Target, "target", target),
            ] {
                if let Err(err) = bundle.insert(role, tag, order) {
                    warn!(%err, "bracket bookkeeping failed, abandoning entry");
                    bundle.clear();
                    return false;
                }
            }
            self.gateway.submit(&submitted);
            bundle.activate_all();
        }

        self.tracker.open(Position {
            side,
            entry_price,
            stop_price,
            target_price,
            quantity,
        });
        info!(
            instrument = %self.instrument,
            ?side,
            quantity,
            entry_price,
            stop_price,
            target_price,
            "entered position"
        );
        true
    }

    /// Close the open position at market. No-op when flat. Returns the
    /// realized round trip.
    pub fn exit(&self, current_price: f64) -> Option<TradeRecord> {
        let position = match self.tracker.close() {
            Some(p) => p,
            None => {
                debug!("exit ignored: no open position");
                return None;
            }
        };

        let cancelled = {
            let mut bundle = self.bundle.lock();
            let ids = bundle.cancel_active("position closed");
            bundle.clear();
            ids
        };
        for id in &cancelled {
            self.gateway.cancel(id);
        }

        let exit_side = match position.side {
            PositionSide::Long => OrderSide::Sell,
            PositionSide::Short => OrderSide::Buy,
        };
        self.gateway
            .close_at_market(&self.instrument, exit_side, position.quantity);

        let realized_pnl = (current_price - position.entry_price)
            * position.side.sign()
            * position.quantity as f64
            * self.point_value;
        info!(
            instrument = %self.instrument,
            side = ?position.side,
            quantity = position.quantity,
            realized_pnl,
            "exited position"
        );

        Some(TradeRecord {
            instrument: self.instrument.clone(),
            side: position.side,
            quantity: position.quantity,
            entry_price: position.entry_price,
            exit_price: current_price,
            realized_pnl,
            closed_at: Utc::now(),
        })
    }

    /// Exit then enter the opposite side. The tracker is flat between the
    /// two steps — both sides are never open at once.
    pub fn reverse(
        &self,
        side: PositionSide,
        entry_price: f64,
        stop_price: f64,
        target_price: f64,
        quantity: i64,
        current_price: f64,
    ) -> Option<TradeRecord> {
        let closed = self.exit(current_price);
        self.enter(side, entry_price, stop_price, target_price, quantity);
        closed
    }

    /// Fill feedback from the host. Invalid fills are rejected at the
    /// boundary without touching any state.
    pub fn on_order_filled(&self, fill: &Fill) {
        if !fill.is_valid() {
            warn!(?fill, "rejected invalid fill");
            return;
        }

        let applied = {
            let mut bundle = self.bundle.lock();
            let applied = bundle.apply_fill(&fill.order_id, fill.quantity);
            if let Some((_, order)) = &applied {
                if !order.is_active() {
                    bundle.remove_by_id(&fill.order_id);
                }
            }
            applied
        };
        let Some((role, _)) = applied else {
            warn!(order_id = %fill.order_id, "fill for unknown order");
            return;
        };

        match role {
            OrderRole::Market => {
                self.tracker.update_entry_price(fill.price);
                debug!(order_id = %fill.order_id, price = fill.price, "entry fill");
            }
            OrderRole::Stop | OrderRole::Target => {
                let remaining = self.tracker.reduce_quantity(fill.quantity);
                if remaining == 0 {
                    let cancelled = {
                        let mut bundle = self.bundle.lock();
                        let ids = bundle.cancel_active("position closed");
                        bundle.clear();
                        ids
                    };
                    for id in &cancelled {
                        self.gateway.cancel(id);
                    }
                    info!(order_id = %fill.order_id, "position fully closed by fill");
                } else {
                    debug!(order_id = %fill.order_id, remaining, "partial exit fill");
                }
            }
        }
    }

    /// Move every active stop (trailing update). Returns how many orders
    /// changed.
    pub fn modify_stops(&self, new_price: f64) -> usize {
        let modified = self.bundle.lock().modify_all_stops(new_price);
        if modified > 0 {
            self.tracker.set_stop_price(new_price);
        }
        modified
    }

    pub fn is_open(&self) -> bool {
        self.tracker.is_open()
    }

    pub fn side(&self) -> Option<PositionSide> {
        self.tracker.side()
    }

    pub fn position(&self) -> Option<Position> {
        self.tracker.snapshot()
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.tracker.unrealized_pnl(current_price, self.point_value)
    }

    pub fn risk_reward_ratio(&self) -> f64 {
        self.tracker.risk_reward_ratio()
    }

    pub fn active_order_count(&self) -> usize {
        self.bundle.lock().active_count()
    }

    /// Look up a live order id by its bundle tag (test and display hook).
    pub fn order_id_for(&self, role: OrderRole, tag: &str) -> Option<OrderId> {
        self.bundle.lock().get(role, tag).map(|o| o.id.clone())
    }
}
