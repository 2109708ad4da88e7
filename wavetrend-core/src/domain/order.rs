//! Order records and fill events.
//!
//! These are the engine's own bookkeeping records. The host's execution API
//! receives them on submission and reports back via `Fill`; lifecycle state
//! here tracks what the engine knows, not what the exchange knows.

use super::ids::OrderId;
use serde::{Deserialize, Serialize};

/// Which way the order trades.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub fn opposite(self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// What kind of order and its price parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum OrderKind {
    /// Fill at the current market price.
    Market,
    /// Triggers when price reaches the trigger level, then fills as market.
    Stop { trigger_price: f64 },
    /// Fill at limit price or better.
    Limit { limit_price: f64 },
}

/// Order lifecycle states, as known to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created but not yet submitted to the host.
    Pending,
    /// Submitted and working.
    Active,
    /// Completely filled.
    Filled,
    /// Cancelled with a reason (position closed, replaced, host cancel).
    Cancelled { reason: String },
}

/// A single order owned by one bundle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub instrument: String,
    pub side: OrderSide,
    pub kind: OrderKind,
    pub quantity: i64,
    pub filled_quantity: i64,
    pub status: OrderStatus,
}

impl Order {
    pub fn new(
        id: OrderId,
        instrument: impl Into<String>,
        side: OrderSide,
        kind: OrderKind,
        quantity: i64,
    ) -> Self {
        Self {
            id,
            instrument: instrument.into(),
            side,
            kind,
            quantity,
            filled_quantity: 0,
            status: OrderStatus::Pending,
        }
    }

    pub fn remaining_quantity(&self) -> i64 {
        self.quantity - self.filled_quantity
    }

    /// Working and not fully filled. Bulk modification only touches these.
    pub fn is_active(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Active)
            && self.remaining_quantity() > 0
    }
}

/// A fill reported by the host's execution API.
///
/// Arrives on an arbitrary thread, after the bar that submitted the order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fill {
    pub order_id: OrderId,
    pub price: f64,
    pub quantity: i64,
}

impl Fill {
    /// Boundary validation: positive finite price, positive quantity.
    /// Invalid fills are rejected without mutating any state.
    pub fn is_valid(&self) -> bool {
        self.price > 0.0 && self.price.is_finite() && self.quantity > 0
    }
}
