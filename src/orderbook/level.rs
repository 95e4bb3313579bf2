//! Price level: FIFO queue of orders resting at one price

use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::VecDeque;

use super::order::{Order, OrderId, OrderStatus};

/// Result of matching an incoming quantity against one price level
#[derive(Debug, Clone, Default)]
pub struct LevelMatch {
    /// Quantity matched at this level
    pub matched: Decimal,
    /// Orders that became fully filled and were removed from the level
    pub filled_orders: Vec<Order>,
}

/// All orders resting at one exact price, in arrival order.
///
/// Invariant: `total_size` always equals the sum of the resident orders'
/// remaining quantities. The book removes a level as soon as it has no
/// resident orders.
#[derive(Debug, Clone, Serialize)]
pub struct PriceLevel {
    /// The price shared by every resident order
    price: Decimal,
    /// Resident orders, front = highest time priority
    orders: VecDeque<Order>,
    /// Sum of resident orders' remaining quantities
    total_size: Decimal,
}

impl PriceLevel {
    /// Creates an empty level at the given price
    #[must_use]
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::new(),
            total_size: Decimal::ZERO,
        }
    }

    /// The level price
    #[must_use]
    pub fn price(&self) -> Decimal {
        self.price
    }

    /// Aggregate remaining quantity across resident orders
    #[must_use]
    pub fn total_size(&self) -> Decimal {
        self.total_size
    }

    /// Number of resident orders
    #[must_use]
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Whether the level has no resident orders
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Iterates resident orders in priority order
    pub fn iter(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    /// Appends an order at the back of the queue and grows the aggregate
    /// by its remaining quantity
    pub fn add(&mut self, order: Order) {
        self.total_size += order.remaining();
        self.orders.push_back(order);
    }

    /// Removes the order with the given id, shrinking the aggregate by its
    /// remaining quantity. Linear scan over resident orders.
    ///
    /// # Returns
    /// The removed order, or `None` if no resident order has that id.
    pub fn remove(&mut self, order_id: OrderId) -> Option<Order> {
        let index = self.orders.iter().position(|order| order.id == order_id)?;
        let order = self.orders.remove(index)?;
        self.total_size -= order.remaining();
        Some(order)
    }

    /// Looks up a resident order without removing it
    #[must_use]
    pub fn get(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id == order_id)
    }

    /// Mutable lookup of a resident order; the caller is responsible for
    /// keeping `total_size` consistent after resizing
    pub(super) fn get_mut(&mut self, order_id: OrderId) -> Option<&mut Order> {
        self.orders.iter_mut().find(|order| order.id == order_id)
    }

    /// Adjusts the aggregate after an in-place size change of a resident order
    pub(super) fn apply_size_delta(&mut self, delta: Decimal) {
        self.total_size += delta;
    }

    /// Matches up to `size` against resident orders in FIFO order.
    ///
    /// Walks the queue from the front, filling each order until the request
    /// is exhausted or the level runs out of orders. Orders that become fully
    /// filled are removed from the level and returned; a partially filled
    /// order stays at the front and keeps its priority.
    pub fn match_size(&mut self, size: Decimal) -> LevelMatch {
        let mut matched = Decimal::ZERO;
        let mut remaining = size;
        let mut filled_orders = Vec::new();

        while remaining > Decimal::ZERO {
            let Some(front) = self.orders.front_mut() else {
                break;
            };

            let applied = front.fill(remaining);
            matched += applied;
            remaining -= applied;

            if front.status == OrderStatus::Filled {
                if let Some(order) = self.orders.pop_front() {
                    filled_orders.push(order);
                }
            } else if applied == Decimal::ZERO {
                // Front order absorbed nothing and is not filled; stop
                // rather than spin.
                break;
            }
        }

        self.total_size -= matched;

        LevelMatch {
            matched,
            filled_orders,
        }
    }
}
