//! Host platform seams.
//!
//! The engine never sees concrete host types; it depends on these small
//! capability traits only. The host adapts its per-bar callback, price
//! history, and execution API to them once at setup.

use crate::domain::{Order, OrderId, OrderSide};
use crate::engine::BarOutput;

/// Per-bar calculation context provided by the host.
pub trait CalcContext {
    /// Close price at an absolute bar index. `None` for missing bars.
    fn close(&self, bar_index: i64) -> Option<f64>;

    /// Persist the bar's derived values for display.
    fn emit(&mut self, bar_index: i64, output: BarOutput);
}

/// Asynchronous order-execution seam.
///
/// Submission returns immediately; fills come back later through
/// `PositionManager::on_order_filled`, possibly on a different thread.
pub trait OrderGateway: Send + Sync {
    fn submit(&self, orders: &[Order]);

    fn cancel(&self, id: &OrderId);

    /// Flatten the whole position at market.
    fn close_at_market(&self, instrument: &str, side: OrderSide, quantity: i64);
}
