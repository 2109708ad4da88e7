//! Grouped, taggable order bookkeeping.
//!
//! A bundle holds the related orders of one bracket — market entry, stop,
//! target — in three tag-keyed maps plus a reverse id index. Membership is
//! exclusive: an order id can live in at most one bundle slot, and removal
//! on fill or cancel is the bundle owner's responsibility. Bulk
//! modification (mass stop adjustment) touches only orders that are still
//! working — filled and cancelled orders are left alone.

use crate::domain::{Order, OrderId, OrderKind, OrderStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Which map of the bundle an order lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderRole {
    Market,
    Stop,
    Target,
}

#[derive(Debug, Error)]
pub enum BundleError {
    #[error("tag {0} already holds a {1:?} order")]
    DuplicateTag(String, OrderRole),

    #[error("order {0} already belongs to this bundle")]
    AlreadyMember(OrderId),
}

#[derive(Debug, Default)]
pub struct OrderBundle {
    market_orders: HashMap<String, Order>,
    stop_orders: HashMap<String, Order>,
    target_orders: HashMap<String, Order>,
    /// Reverse index: order id → (role, tag).
    index: HashMap<OrderId, (OrderRole, String)>,
}

impl OrderBundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an order under a tag. Fails if the tag is taken for that role or
    /// the order already belongs to the bundle.
    pub fn insert(
        &mut self,
        role: OrderRole,
        tag: impl Into<String>,
        order: Order,
    ) -> Result<(), BundleError> {
        let tag = tag.into();
        if self.index.contains_key(&order.id) {
            return Err(BundleError::AlreadyMember(order.id));
        }
        let map = self.map_mut(role);
        if map.contains_key(&tag) {
            return Err(BundleError::DuplicateTag(tag, role));
        }
        self.index.insert(order.id.clone(), (role, tag.clone()));
        self.map_mut(role).insert(tag, order);
        Ok(())
    }

    pub fn get(&self, role: OrderRole, tag: &str) -> Option<&Order> {
        self.map(role).get(tag)
    }

    pub fn find_by_id(&self, id: &OrderId) -> Option<&Order> {
        let (role, tag) = self.index.get(id)?;
        self.map(*role).get(tag)
    }

    pub fn tag_of(&self, id: &OrderId) -> Option<&str> {
        self.index.get(id).map(|(_, tag)| tag.as_str())
    }

    pub fn role_of(&self, id: &OrderId) -> Option<OrderRole> {
        self.index.get(id).map(|(role, _)| *role)
    }

    /// Remove an order; the owner calls this once a fill or cancel makes the
    /// order dead.
    pub fn remove_by_id(&mut self, id: &OrderId) -> Option<Order> {
        let (role, tag) = self.index.remove(id)?;
        self.map_mut(role).remove(&tag)
    }

    /// Mark every pending order as working. Called after the host accepts
    /// the submitted bracket.
    pub fn activate_all(&mut self) {
        for order in self.orders_mut() {
            if order.status == OrderStatus::Pending {
                order.status = OrderStatus::Active;
            }
        }
    }

    /// Record a fill against a member order. Returns the role and an updated
    /// snapshot, or `None` for an unknown id.
    pub fn apply_fill(&mut self, id: &OrderId, quantity: i64) -> Option<(OrderRole, Order)> {
        let (role, tag) = self.index.get(id)?.clone();
        let order = self.map_mut(role).get_mut(&tag)?;
        order.filled_quantity = (order.filled_quantity + quantity).min(order.quantity);
        if order.remaining_quantity() == 0 {
            order.status = OrderStatus::Filled;
        }
        Some((role, order.clone()))
    }

    /// Move every active stop to `new_price`. Filled and cancelled orders
    /// are untouched; the returned count is exactly the mutated set.
    pub fn modify_all_stops(&mut self, new_price: f64) -> usize {
        Self::modify_triggers(&mut self.stop_orders, new_price)
    }

    /// Same as [`modify_all_stops`](Self::modify_all_stops) for targets.
    pub fn modify_all_targets(&mut self, new_price: f64) -> usize {
        let mut modified = 0;
        for order in self.target_orders.values_mut().filter(|o| o.is_active()) {
            if let OrderKind::Limit { limit_price } = &mut order.kind {
                *limit_price = new_price;
                modified += 1;
            }
        }
        modified
    }

    /// Cancel one member order (host-initiated cancel feedback). Returns
    /// whether anything changed.
    pub fn cancel_one(&mut self, id: &OrderId) -> bool {
        let Some((role, tag)) = self.index.get(id).cloned() else {
            return false;
        };
        match self.map_mut(role).get_mut(&tag) {
            Some(order) if order.is_active() => {
                order.status = OrderStatus::Cancelled {
                    reason: "host cancel".to_string(),
                };
                true
            }
            _ => false,
        }
    }

    /// Cancel all still-active orders, returning their ids so the owner can
    /// forward the cancels to the host.
    pub fn cancel_active(&mut self, reason: &str) -> Vec<OrderId> {
        let mut cancelled = Vec::new();
        for order in self.orders_mut() {
            if order.is_active() {
                order.status = OrderStatus::Cancelled {
                    reason: reason.to_string(),
                };
                cancelled.push(order.id.clone());
            }
        }
        cancelled
    }

    pub fn clear(&mut self) {
        self.market_orders.clear();
        self.stop_orders.clear();
        self.target_orders.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.orders().filter(|o| o.is_active()).count()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.market_orders
            .values()
            .chain(self.stop_orders.values())
            .chain(self.target_orders.values())
    }

    fn orders_mut(&mut self) -> impl Iterator<Item = &mut Order> {
        self.market_orders
            .values_mut()
            .chain(self.stop_orders.values_mut())
            .chain(self.target_orders.values_mut())
    }

    fn modify_triggers(orders: &mut HashMap<String, Order>, new_price: f64) -> usize {
        let mut modified = 0;
        for order in orders.values_mut().filter(|o| o.is_active()) {
            if let OrderKind::Stop { trigger_price } = &mut order.kind {
                *trigger_price = new_price;
                modified += 1;
            }
        }
        modified
    }

    fn map(&self, role: OrderRole) -> &HashMap<String, Order> {
        match role {
            OrderRole::Market => &self.market_orders,
            OrderRole::Stop => &self.stop_orders,
            OrderRole::Target => &self.target_orders,
        }
    }

    fn map_mut(&mut self, role: OrderRole) -> &mut HashMap<String, Order> {
        match role {
            OrderRole::Market => &mut self.market_orders,
            OrderRole::Stop => &mut self.stop_orders,
            OrderRole::Target => &mut self.target_orders,
        }
    }
}
