//! Domain types shared across the engine: IDs, orders, positions, trades.

pub mod ids;
pub mod order;
pub mod position;

pub use ids::{IdGen, OrderId};
pub use order::{Fill, Order, OrderKind, OrderSide, OrderStatus};
pub use position::{Position, PositionSide, TradeRecord};
