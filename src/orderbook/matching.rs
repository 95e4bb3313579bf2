//! Price-time-priority matching of market orders against resting liquidity

use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

use super::book::OrderBook;
use super::level::PriceLevel;
use super::order::{Order, OrderId, Side};
use super::trade::TradeResult;

/// Outcome of one market-order execution.
///
/// `matched < requested` means the book ran out of opposing liquidity; that
/// is a reportable condition, not an error.
#[derive(Debug, Clone, Serialize)]
pub struct MarketOrderResult {
    /// Size the taker asked for
    pub requested: Decimal,
    /// Size actually executed, `<= requested`
    pub matched: Decimal,
    /// Volume-weighted average execution price, zero when nothing matched
    pub avg_price: Decimal,
    /// Resting orders completely filled by this execution
    pub filled_orders: Vec<Order>,
    /// Unexecuted remainder, zero when fully filled
    pub remaining: Decimal,
    /// True when the full requested size executed
    pub is_complete: bool,
}

impl OrderBook {
    /// Executes a market order against resting liquidity.
    ///
    /// Sweeps the opposing side best price first: a Buy consumes asks from
    /// the lowest price upward, a Sell consumes bids from the highest price
    /// downward. Orders within each level fill in time priority. Fully
    /// filled orders leave the id index and vacated levels are deleted.
    ///
    /// The sequence number advances even when nothing matched; a market-order
    /// attempt counts as a book-level occurrence. The trade listener fires
    /// only for executions that matched a positive size.
    ///
    /// # Arguments
    ///
    /// * `side` - The taker's side
    /// * `size` - The size to execute
    ///
    /// # Returns
    ///
    /// A [`MarketOrderResult`]; insufficient liquidity is reported through
    /// its `remaining` and `is_complete` fields.
    pub fn match_market_order(&mut self, side: Side, size: Decimal) -> MarketOrderResult {
        trace!("Matching market {} {} on {}", side, size, self.symbol);

        let (matched, value, filled_orders) = match side {
            Side::Buy => Self::sweep(&mut self.asks, &mut self.orders, size),
            Side::Sell => Self::sweep(&mut self.bids, &mut self.orders, size),
        };
        self.touch();

        let avg_price = if matched > Decimal::ZERO {
            value / matched
        } else {
            Decimal::ZERO
        };
        let result = MarketOrderResult {
            requested: size,
            matched,
            avg_price,
            filled_orders,
            remaining: (size - matched).max(Decimal::ZERO),
            is_complete: matched >= size,
        };

        if result.matched > Decimal::ZERO {
            if let Some(listener) = &self.trade_listener {
                let trade = TradeResult::new(self.symbol.clone(), side, &result);
                listener(&trade);
            }
        }
        result
    }

    /// Walks one side's levels best-first, filling FIFO within each level.
    ///
    /// Fully filled orders are de-indexed here so the book never routes a
    /// cancel or update to an order that already left its level.
    ///
    /// Returns (matched size, matched notional, fully filled orders).
    fn sweep<K: Ord>(
        levels: &mut BTreeMap<K, PriceLevel>,
        orders: &mut HashMap<OrderId, (Decimal, Side)>,
        size: Decimal,
    ) -> (Decimal, Decimal, Vec<Order>) {
        let mut remaining = size;
        let mut matched = Decimal::ZERO;
        let mut value = Decimal::ZERO;
        let mut filled_orders = Vec::new();

        while remaining > Decimal::ZERO {
            let Some(mut entry) = levels.first_entry() else {
                break;
            };
            let level = entry.get_mut();
            let price = level.price();
            let level_match = level.match_size(remaining);
            let level_empty = level.is_empty();

            matched += level_match.matched;
            value += level_match.matched * price;
            remaining -= level_match.matched;
            for order in &level_match.filled_orders {
                orders.remove(&order.id);
            }
            filled_orders.extend(level_match.filled_orders);

            if level_empty {
                entry.remove();
            } else {
                // Level retains size: the taker is exhausted or the level
                // stalled on an inactive front order.
                break;
            }
        }

        (matched, value, filled_orders)
    }
}
