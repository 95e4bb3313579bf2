//! Order types and the per-order fill/cancel state machine

use crate::utils::current_time_millis;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an order.
///
/// Backed by a UUID. Feed-synthesized orders get fresh v4 ids; tests can use
/// the deterministic [`OrderId::from_u64`] constructor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    /// Creates a new random (v4) order id
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Creates a deterministic order id from a u64, useful in tests
    #[must_use]
    pub fn from_u64(value: u64) -> Self {
        Self(Uuid::from_u128(u128::from(value)))
    }

    /// Returns the underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for OrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Side of an order: bid (Buy) or ask (Sell)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// Buy side (bids)
    Buy,
    /// Sell side (asks)
    Sell,
}

impl Side {
    /// Returns the opposite side
    #[must_use]
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => write!(f, "buy"),
            Side::Sell => write!(f, "sell"),
        }
    }
}

/// Order type accepted by the book.
///
/// Only `Limit` and `Market` are exercised by the matching logic; the
/// remaining kinds are carried as metadata and rest like limit orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderType {
    /// Rests at its price until matched or canceled
    Limit,
    /// Executes immediately against resting liquidity
    Market,
    /// Stop order metadata
    Stop,
    /// Stop-limit order metadata
    StopLimit,
    /// Immediate-or-cancel metadata
    Ioc,
    /// Fill-or-kill metadata
    Fok,
    /// Post-only metadata
    PostOnly,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Limit => write!(f, "limit"),
            OrderType::Market => write!(f, "market"),
            OrderType::Stop => write!(f, "stop"),
            OrderType::StopLimit => write!(f, "stop_limit"),
            OrderType::Ioc => write!(f, "ioc"),
            OrderType::Fok => write!(f, "fok"),
            OrderType::PostOnly => write!(f, "post_only"),
        }
    }
}

/// Lifecycle status of an order.
///
/// Transitions are `Active -> Filled` (fully executed) or
/// `Active -> Canceled`; there is no transition out of a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Resting in the book, eligible for matching
    Active,
    /// Fully executed
    Filled,
    /// Canceled before full execution
    Canceled,
}

/// A single order resting in (or removed from) the book.
///
/// Invariant: `filled <= size` at all times; `remaining()` is the quantity
/// still eligible for matching.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique order identifier
    pub id: OrderId,
    /// Limit price
    pub price: Decimal,
    /// Total requested quantity
    pub size: Decimal,
    /// Buy or Sell
    pub side: Side,
    /// Order type metadata
    pub order_type: OrderType,
    /// Creation time in milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Lifecycle status
    pub status: OrderStatus,
    /// Quantity filled so far
    pub filled: Decimal,
}

impl Order {
    /// Creates a new active order with a fresh id and the current timestamp
    #[must_use]
    pub fn new(price: Decimal, size: Decimal, side: Side, order_type: OrderType) -> Self {
        Self::with_id(OrderId::new(), price, size, side, order_type)
    }

    /// Creates a new active order under an externally assigned id
    #[must_use]
    pub fn with_id(
        id: OrderId,
        price: Decimal,
        size: Decimal,
        side: Side,
        order_type: OrderType,
    ) -> Self {
        Self {
            id,
            price,
            size,
            side,
            order_type,
            timestamp: current_time_millis(),
            status: OrderStatus::Active,
            filled: Decimal::ZERO,
        }
    }

    /// Creates a new active order with an explicit id and timestamp
    #[must_use]
    pub fn with_timestamp(
        id: OrderId,
        price: Decimal,
        size: Decimal,
        side: Side,
        order_type: OrderType,
        timestamp: u64,
    ) -> Self {
        Self {
            timestamp,
            ..Self::with_id(id, price, size, side, order_type)
        }
    }

    /// Quantity still eligible for matching
    #[must_use]
    pub fn remaining(&self) -> Decimal {
        self.size - self.filled
    }

    /// Whether the order is still resting and matchable
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == OrderStatus::Active
    }

    /// Applies up to `amount` of fill to this order.
    ///
    /// Fills `min(amount, remaining())` and transitions to
    /// [`OrderStatus::Filled`] once the order is exhausted.
    ///
    /// # Returns
    /// The quantity actually applied, zero if the order is not active or
    /// `amount` is not positive.
    pub fn fill(&mut self, amount: Decimal) -> Decimal {
        if self.status != OrderStatus::Active || amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let applied = amount.min(self.remaining());
        self.filled += applied;

        if self.filled >= self.size {
            self.status = OrderStatus::Filled;
        }

        applied
    }

    /// Cancels the order.
    ///
    /// # Returns
    /// `true` if the order was active and is now canceled, `false` if it was
    /// already in a terminal state.
    pub fn cancel(&mut self) -> bool {
        if self.status == OrderStatus::Active {
            self.status = OrderStatus::Canceled;
            return true;
        }
        false
    }
}
