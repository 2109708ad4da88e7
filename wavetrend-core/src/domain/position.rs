//! Position state and realized-trade records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Position side (semantic representation)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PositionSide {
    Long,
    Short,
}

impl PositionSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// +1.0 for long, -1.0 for short.
    pub fn sign(self) -> f64 {
        match self {
            Self::Long => 1.0,
            Self::Short => -1.0,
        }
    }
}

/// One open position: entry/stop/target prices, side, quantity.
///
/// Created on entry, mutated on partial fills and stop updates, reset to
/// flat (dropped) on full exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: PositionSide,
    pub entry_price: f64,
    pub stop_price: f64,
    pub target_price: f64,
    pub quantity: i64,
}

impl Position {
    /// Signed mark-to-market P&L at `current_price`.
    pub fn unrealized_pnl(&self, current_price: f64, point_value: f64) -> f64 {
        (current_price - self.entry_price) * self.side.sign() * self.quantity as f64 * point_value
    }

    /// Distance from entry to stop, in points.
    pub fn risk(&self) -> f64 {
        (self.entry_price - self.stop_price).abs()
    }

    /// Distance from entry to target, in points.
    pub fn reward(&self) -> f64 {
        (self.target_price - self.entry_price).abs()
    }

    /// Reward / risk. 0 when the stop sits on the entry (no defined risk).
    pub fn risk_reward_ratio(&self) -> f64 {
        let risk = self.risk();
        if risk == 0.0 {
            0.0
        } else {
            self.reward() / risk
        }
    }
}

/// Record of one completed round trip, produced on exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub instrument: String,
    pub side: PositionSide,
    pub quantity: i64,
    pub entry_price: f64,
    pub exit_price: f64,
    pub realized_pnl: f64,
    pub closed_at: DateTime<Utc>,
}
