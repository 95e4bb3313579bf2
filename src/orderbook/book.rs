//! Core OrderBook implementation for managing price levels and orders

use std::cmp::Reverse;
use std::collections::{BTreeMap, HashMap};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::trace;

use crate::utils::current_time_millis;

use super::error::OrderBookError;
use super::level::PriceLevel;
use super::order::{Order, OrderId, Side};
use super::trade::TradeListener;

/// The OrderBook manages price levels for both bid and ask sides of a single
/// symbol, along with an id index for direct order access.
///
/// Mutating operations take `&mut self`; the borrow checker serializes all
/// mutations on one book. Cross-symbol concurrency is the manager's job.
pub struct OrderBook {
    /// The symbol or identifier for this order book
    pub(super) symbol: String,

    /// Bid side price levels (buy orders), keyed by descending price so that
    /// iteration starts at the best bid
    pub(super) bids: BTreeMap<Reverse<Decimal>, PriceLevel>,

    /// Ask side price levels (sell orders), keyed by ascending price so that
    /// iteration starts at the best ask
    pub(super) asks: BTreeMap<Decimal, PriceLevel>,

    /// Map from order ID to (price, side) for fast lookups
    /// This avoids having to search through all price levels to find an order
    pub(super) orders: HashMap<OrderId, (Decimal, Side)>,

    /// Monotonic sequence number, incremented on every book-level occurrence
    pub(super) sequence: u64,

    /// Unix timestamp in milliseconds of the last update
    pub(super) last_update_time: u64,

    /// listens to trades produced when a market order executes
    pub trade_listener: Option<TradeListener>,
}

impl OrderBook {
    /// Creates a new order book for the given symbol.
    ///
    /// # Example
    ///
    /// ```
    /// use lob_engine::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let mut book = OrderBook::new("BTC/USD");
    /// let order = Order::new(dec!(100), dec!(5), Side::Buy, OrderType::Limit);
    /// book.add_order(order).unwrap();
    /// assert_eq!(book.best_bid(), Some((dec!(100), dec!(5))));
    /// ```
    #[must_use]
    pub fn new(symbol: &str) -> Self {
        Self {
            symbol: symbol.to_string(),
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
            sequence: 0,
            last_update_time: current_time_millis(),
            trade_listener: None,
        }
    }

    /// Creates a new order book with a trade listener attached.
    ///
    /// The listener fires after every market-order execution that matched a
    /// positive quantity, once the book mutation has completed.
    #[must_use]
    pub fn with_trade_listener(symbol: &str, trade_listener: TradeListener) -> Self {
        let mut book = Self::new(symbol);
        book.trade_listener = Some(trade_listener);
        book
    }

    /// The symbol this book manages.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Monotonic sequence number of the last book-level occurrence.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Unix timestamp in milliseconds of the last update.
    #[must_use]
    pub fn last_update_time(&self) -> u64 {
        self.last_update_time
    }

    /// Bumps the sequence number and refreshes the last-update timestamp.
    pub(super) fn touch(&mut self) {
        self.sequence += 1;
        self.last_update_time = current_time_millis();
    }

    /// Adds a resting order to the book.
    ///
    /// The order joins the back of the queue at its price level; a level is
    /// created if none exists at that price. The book accepts crossed prices
    /// as given, it mirrors the feed rather than enforcing non-crossing.
    ///
    /// # Errors
    ///
    /// Returns [`OrderBookError::DuplicateOrder`] if an order with the same id
    /// is already resident.
    pub fn add_order(&mut self, order: Order) -> Result<(), OrderBookError> {
        if self.orders.contains_key(&order.id) {
            return Err(OrderBookError::DuplicateOrder { id: order.id });
        }

        trace!(
            "Adding order {} {} {} @ {} to {}",
            order.id, order.side, order.size, order.price, self.symbol
        );

        let (price, side, id) = (order.price, order.side, order.id);
        match side {
            Side::Buy => self
                .bids
                .entry(Reverse(price))
                .or_insert_with(|| PriceLevel::new(price))
                .add(order),
            Side::Sell => self
                .asks
                .entry(price)
                .or_insert_with(|| PriceLevel::new(price))
                .add(order),
        }
        self.orders.insert(id, (price, side));
        self.touch();
        Ok(())
    }

    /// Cancels a resting order and removes it from the book.
    ///
    /// The vacated price level is deleted when the order was the last one
    /// resting there.
    ///
    /// # Returns
    ///
    /// The canceled order, with its status set to `Canceled`.
    ///
    /// # Errors
    ///
    /// Returns [`OrderBookError::OrderNotFound`] if the id is not indexed.
    pub fn cancel_order(&mut self, id: OrderId) -> Result<Order, OrderBookError> {
        let Some(&(price, side)) = self.orders.get(&id) else {
            return Err(OrderBookError::OrderNotFound { id });
        };

        let mut order = match side {
            Side::Buy => Self::take_from_level(&mut self.bids, Reverse(price), id),
            Side::Sell => Self::take_from_level(&mut self.asks, price, id),
        }
        .ok_or(OrderBookError::OrderNotFound { id })?;

        order.cancel();
        self.orders.remove(&id);
        self.touch();
        trace!("Canceled order {} on {}", id, self.symbol);
        Ok(order)
    }

    /// Resizes a resting order in place.
    ///
    /// `new_size` is the order's new total size. The level aggregate is
    /// adjusted by the remaining-size delta and the order keeps its queue
    /// position, so a size change never forfeits time priority.
    ///
    /// # Errors
    ///
    /// Returns [`OrderBookError::OrderNotFound`] if the id is not indexed, or
    /// [`OrderBookError::InvalidSize`] if `new_size` does not exceed the
    /// already-filled amount.
    pub fn update_order(&mut self, id: OrderId, new_size: Decimal) -> Result<(), OrderBookError> {
        let Some(&(price, side)) = self.orders.get(&id) else {
            return Err(OrderBookError::OrderNotFound { id });
        };

        let level = match side {
            Side::Buy => self.bids.get_mut(&Reverse(price)),
            Side::Sell => self.asks.get_mut(&price),
        }
        .ok_or(OrderBookError::OrderNotFound { id })?;
        let order = level
            .get_mut(id)
            .ok_or(OrderBookError::OrderNotFound { id })?;

        if new_size <= order.filled {
            return Err(OrderBookError::InvalidSize {
                id,
                size: new_size,
                filled: order.filled,
            });
        }

        // Remaining delta equals the total-size delta since filled is fixed.
        let delta = new_size - order.size;
        order.size = new_size;
        level.apply_size_delta(delta);
        self.touch();
        trace!("Updated order {} to size {} on {}", id, new_size, self.symbol);
        Ok(())
    }

    /// Looks up a resting order by id.
    #[must_use]
    pub fn get_order(&self, id: OrderId) -> Option<&Order> {
        let &(price, side) = self.orders.get(&id)?;
        match side {
            Side::Buy => self.bids.get(&Reverse(price))?.get(id),
            Side::Sell => self.asks.get(&price)?.get(id),
        }
    }

    /// Returns the best bid as a (price, level total size) pair.
    #[must_use]
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids
            .first_key_value()
            .map(|(key, level)| (key.0, level.total_size()))
    }

    /// Returns the best ask as a (price, level total size) pair.
    #[must_use]
    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks
            .first_key_value()
            .map(|(price, level)| (*price, level.total_size()))
    }

    /// Midpoint between the best bid and best ask.
    ///
    /// # Returns
    ///
    /// `(best_bid + best_ask) / 2`, or zero when either side is empty.
    #[must_use]
    pub fn mid_price(&self) -> Decimal {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => (bid + ask) / Decimal::TWO,
            _ => Decimal::ZERO,
        }
    }

    /// Spread between the best ask and best bid.
    ///
    /// # Returns
    ///
    /// `best_ask - best_bid`, or zero when either side is empty. Negative in
    /// a crossed book.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => ask - bid,
            _ => Decimal::ZERO,
        }
    }

    /// Returns up to `depth` (price, total size) pairs on one side, best
    /// price first.
    #[must_use]
    pub fn get_price_levels(&self, side: Side, depth: usize) -> Vec<(Decimal, Decimal)> {
        match side {
            Side::Buy => self
                .bids
                .iter()
                .take(depth)
                .map(|(key, level)| (key.0, level.total_size()))
                .collect(),
            Side::Sell => self
                .asks
                .iter()
                .take(depth)
                .map(|(price, level)| (*price, level.total_size()))
                .collect(),
        }
    }

    /// Total resting size across all bid levels.
    #[must_use]
    pub fn total_bid_volume(&self) -> Decimal {
        self.bids.values().map(PriceLevel::total_size).sum()
    }

    /// Total resting size across all ask levels.
    #[must_use]
    pub fn total_ask_volume(&self) -> Decimal {
        self.asks.values().map(PriceLevel::total_size).sum()
    }

    /// Number of resting orders on the bid side.
    #[must_use]
    pub fn bid_order_count(&self) -> usize {
        self.bids.values().map(PriceLevel::order_count).sum()
    }

    /// Number of resting orders on the ask side.
    #[must_use]
    pub fn ask_order_count(&self) -> usize {
        self.asks.values().map(PriceLevel::order_count).sum()
    }

    /// Number of populated bid price levels.
    #[must_use]
    pub fn bid_level_count(&self) -> usize {
        self.bids.len()
    }

    /// Number of populated ask price levels.
    #[must_use]
    pub fn ask_level_count(&self) -> usize {
        self.asks.len()
    }

    /// True when neither side holds any orders.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bids.is_empty() && self.asks.is_empty()
    }

    /// Removes an order from its level and drops the level if vacated.
    fn take_from_level<K: Ord>(
        levels: &mut BTreeMap<K, PriceLevel>,
        key: K,
        id: OrderId,
    ) -> Option<Order> {
        let level = levels.get_mut(&key)?;
        let order = level.remove(id)?;
        if level.is_empty() {
            levels.remove(&key);
        }
        Some(order)
    }
}

impl Serialize for OrderBook {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("OrderBook", 5)?;

        state.serialize_field("symbol", &self.symbol)?;

        // Serialize each side as (price, total size) pairs, best price first
        let bids: Vec<(Decimal, Decimal)> = self.get_price_levels(Side::Buy, usize::MAX);
        state.serialize_field("bids", &bids)?;
        let asks: Vec<(Decimal, Decimal)> = self.get_price_levels(Side::Sell, usize::MAX);
        state.serialize_field("asks", &asks)?;

        state.serialize_field("sequence", &self.sequence)?;
        state.serialize_field("last_update_time", &self.last_update_time)?;

        // Skip trade_listener (cannot be serialized) and the order index

        state.end()
    }
}

impl std::fmt::Debug for OrderBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderBook")
            .field("symbol", &self.symbol)
            .field("bid_levels", &self.bids.len())
            .field("ask_levels", &self.asks.len())
            .field("orders", &self.orders.len())
            .field("sequence", &self.sequence)
            .field("last_update_time", &self.last_update_time)
            .finish()
    }
}
