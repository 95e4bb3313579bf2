//! Trade reporting: the result type handed to listeners after each execution

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::utils::current_time_millis;

use super::matching::MarketOrderResult;
use super::order::{OrderId, Side};

/// Symbol-tagged summary of one market-order execution.
///
/// Produced by the book after every execution that matched at least one
/// resting order, and handed to the configured [`TradeListener`] or channel.
#[derive(Debug, Clone, Serialize)]
pub struct TradeResult {
    /// The symbol this trade belongs to
    pub symbol: String,
    /// Side of the incoming (taker) order
    pub side: Side,
    /// Size the taker asked for
    pub requested: Decimal,
    /// Size actually executed, `<= requested`
    pub matched: Decimal,
    /// Volume-weighted average execution price, zero when nothing matched
    pub avg_price: Decimal,
    /// Ids of resting orders completely filled by this execution
    pub filled_order_ids: Vec<OrderId>,
    /// Unix timestamp in milliseconds when the execution completed
    pub timestamp: u64,
}

impl TradeResult {
    /// Builds a `TradeResult` from a completed match.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The trading symbol
    /// * `side` - The taker's side
    /// * `result` - The match result returned by the book
    #[must_use]
    pub fn new(symbol: String, side: Side, result: &MarketOrderResult) -> Self {
        Self {
            symbol,
            side,
            requested: result.requested,
            matched: result.matched,
            avg_price: result.avg_price,
            filled_order_ids: result.filled_orders.iter().map(|order| order.id).collect(),
            timestamp: current_time_millis(),
        }
    }

    /// Returns the notional value of this trade (`matched * avg_price`).
    #[must_use]
    #[inline]
    pub fn notional(&self) -> Decimal {
        self.matched * self.avg_price
    }
}

/// Trade listener specification using Arc for shared ownership
pub type TradeListener = Arc<dyn Fn(&TradeResult) + Send + Sync>;
