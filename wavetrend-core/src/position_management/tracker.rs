//! Thread-safe tracking of the one open position.
//!
//! Fill callbacks arrive on arbitrary host threads while the calculation
//! thread reads P&L for display, so every accessor goes through the
//! tracker's own lock. The tracker holds at most one position; the manager
//! enforces that invariant at entry.

use crate::domain::{Position, PositionSide};
use parking_lot::Mutex;
use tracing::warn;

#[derive(Debug, Default)]
pub struct PositionTracker {
    inner: Mutex<Option<Position>>,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly entered position. Refuses (and warns) when one is
    /// already open.
    pub fn open(&self, position: Position) -> bool {
        let mut guard = self.inner.lock();
        if guard.is_some() {
            warn!("position already open, ignoring duplicate open");
            return false;
        }
        *guard = Some(position);
        true
    }

    /// Take the position out, leaving the tracker flat.
    pub fn close(&self) -> Option<Position> {
        self.inner.lock().take()
    }

    /// Reset to flat without returning anything.
    pub fn reset(&self) {
        *self.inner.lock() = None;
    }

    pub fn is_open(&self) -> bool {
        self.inner.lock().is_some()
    }

    pub fn side(&self) -> Option<PositionSide> {
        self.inner.lock().as_ref().map(|p| p.side)
    }

    pub fn quantity(&self) -> i64 {
        self.inner.lock().as_ref().map_or(0, |p| p.quantity)
    }

    pub fn snapshot(&self) -> Option<Position> {
        self.inner.lock().clone()
    }

    /// Overwrite the tracked entry price (actual fill price, or the
    /// caller's partial-fill average).
    pub fn update_entry_price(&self, price: f64) -> bool {
        match self.inner.lock().as_mut() {
            Some(position) => {
                position.entry_price = price;
                true
            }
            None => false,
        }
    }

    /// Move the protective stop (trailing updates).
    pub fn set_stop_price(&self, price: f64) -> bool {
        match self.inner.lock().as_mut() {
            Some(position) => {
                position.stop_price = price;
                true
            }
            None => false,
        }
    }

    pub fn set_target_price(&self, price: f64) -> bool {
        match self.inner.lock().as_mut() {
            Some(position) => {
                position.target_price = price;
                true
            }
            None => false,
        }
    }

    /// Reduce the open quantity by a closing fill. Returns the remaining
    /// quantity; at zero the tracker resets to flat.
    pub fn reduce_quantity(&self, quantity: i64) -> i64 {
        let mut guard = self.inner.lock();
        let Some(position) = guard.as_mut() else {
            return 0;
        };
        position.quantity = (position.quantity - quantity.max(0)).max(0);
        let remaining = position.quantity;
        if remaining == 0 {
            *guard = None;
        }
        remaining
    }

    /// Signed mark-to-market P&L; 0 when flat.
    pub fn unrealized_pnl(&self, current_price: f64, point_value: f64) -> f64 {
        self.inner
            .lock()
            .as_ref()
            .map_or(0.0, |p| p.unrealized_pnl(current_price, point_value))
    }

    /// Entry-to-stop distance; 0 when flat.
    pub fn risk(&self) -> f64 {
        self.inner.lock().as_ref().map_or(0.0, Position::risk)
    }

    /// Entry-to-target distance; 0 when flat.
    pub fn reward(&self) -> f64 {
        self.inner.lock().as_ref().map_or(0.0, Position::reward)
    }

    /// Reward / risk; 0 when flat or when risk is 0.
    pub fn risk_reward_ratio(&self) -> f64 {
        self.inner
            .lock()
            .as_ref()
            .map_or(0.0, Position::risk_reward_ratio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long(quantity: i64) -> Position {
        Position {
            side: PositionSide::Long,
            entry_price: 100.0,
            stop_price: 96.0,
            target_price: 108.0,
            quantity,
        }
    }

    #[test]
    fn open_rejects_second_position() {
        let tracker = PositionTracker::new();
        assert!(tracker.open(long(2)));
        assert!(!tracker.open(long(1)));
        // The first position is untouched.
        assert_eq!(tracker.quantity(), 2);
    }

    #[test]
    fn close_takes_the_position() {
        let tracker = PositionTracker::new();
        tracker.open(long(2));
        let closed = tracker.close().unwrap();
        assert_eq!(closed.quantity, 2);
        assert!(!tracker.is_open());
        assert!(tracker.close().is_none());
    }

    #[test]
    fn metrics_are_zero_when_flat() {
        let tracker = PositionTracker::new();
        assert_eq!(tracker.unrealized_pnl(123.0, 50.0), 0.0);
        assert_eq!(tracker.risk(), 0.0);
        assert_eq!(tracker.reward(), 0.0);
        assert_eq!(tracker.risk_reward_ratio(), 0.0);
        assert_eq!(tracker.quantity(), 0);
    }

    #[test]
    fn metrics_pass_through_to_position() {
        let tracker = PositionTracker::new();
        tracker.open(long(2));
        assert_eq!(tracker.unrealized_pnl(103.0, 50.0), 300.0);
        assert_eq!(tracker.risk(), 4.0);
        assert_eq!(tracker.reward(), 8.0);
        assert_eq!(tracker.risk_reward_ratio(), 2.0);
    }

    #[test]
    fn reduce_quantity_resets_at_zero() {
        let tracker = PositionTracker::new();
        tracker.open(long(3));
        assert_eq!(tracker.reduce_quantity(2), 1);
        assert!(tracker.is_open());
        assert_eq!(tracker.reduce_quantity(1), 0);
        assert!(!tracker.is_open());
        // Further reductions are harmless.
        assert_eq!(tracker.reduce_quantity(5), 0);
    }

    #[test]
    fn reset_discards_without_returning() {
        let tracker = PositionTracker::new();
        tracker.open(long(2));
        tracker.reset();
        assert!(!tracker.is_open());
        assert!(tracker.side().is_none());
    }

    #[test]
    fn stop_and_entry_updates_require_open_position() {
        let tracker = PositionTracker::new();
        assert!(!tracker.set_stop_price(97.0));
        assert!(!tracker.update_entry_price(101.0));

        tracker.open(long(1));
        assert!(tracker.set_stop_price(97.0));
        assert!(tracker.update_entry_price(100.5));
        assert!(tracker.set_target_price(109.0));
        let snap = tracker.snapshot().unwrap();
        assert_eq!(snap.stop_price, 97.0);
        assert_eq!(snap.entry_price, 100.5);
        assert_eq!(snap.target_price, 109.0);
    }
}
