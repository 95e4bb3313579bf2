//! Multi-book management with feed event dispatch and centralized trade
//! routing.
//!
//! The manager owns one [`OrderBook`] per symbol and applies the normalized
//! feed protocol: incremental order events, executed trades, and full
//! snapshots. Books are created lazily the first time a symbol is mutated;
//! read paths never create state.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::one::RefMut;
use rust_decimal::Decimal;
use tracing::{error, info};

use crate::utils::current_time_millis;

use super::book::OrderBook;
use super::error::OrderBookError;
use super::events::{EventKind, OrderEvent, SnapshotPayload};
use super::matching::MarketOrderResult;
use super::order::{Order, OrderType, Side};
use super::snapshot::OrderBookSnapshot;
use super::trade::{TradeListener, TradeResult};

/// What applying an event did to the book.
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// The book was modified in place (add, cancel or update)
    Applied,
    /// A trade swept the book; the fill details are attached even when
    /// nothing matched
    Traded(MarketOrderResult),
}

/// Owns the per-symbol books and dispatches feed events to them.
///
/// All methods take `&self`: the registry is a concurrent map and each book
/// is locked individually for the duration of one operation.
pub struct OrderBookManager {
    /// Books indexed by symbol
    books: DashMap<String, OrderBook>,
    /// Listener installed on every book this manager creates
    trade_listener: Option<TradeListener>,
}

impl OrderBookManager {
    /// Creates an empty manager without trade routing.
    #[must_use]
    pub fn new() -> Self {
        Self {
            books: DashMap::new(),
            trade_listener: None,
        }
    }

    /// Creates a manager that installs `trade_listener` on every book.
    #[must_use]
    pub fn with_trade_listener(trade_listener: TradeListener) -> Self {
        Self {
            books: DashMap::new(),
            trade_listener: Some(trade_listener),
        }
    }

    /// Creates a manager that forwards every trade over a standard library
    /// mpsc channel.
    ///
    /// Send failures are logged and swallowed so a dropped receiver never
    /// disturbs matching.
    #[must_use]
    pub fn with_trade_channel(sender: std::sync::mpsc::Sender<TradeResult>) -> Self {
        let listener: TradeListener = Arc::new(move |trade: &TradeResult| {
            if let Err(send_error) = sender.send(trade.clone()) {
                error!(
                    "Failed to forward trade for {}: {}",
                    trade.symbol, send_error
                );
            }
        });
        Self::with_trade_listener(listener)
    }

    /// Creates a manager that forwards every trade over a Tokio unbounded
    /// mpsc channel.
    ///
    /// Send failures are logged and swallowed so a dropped receiver never
    /// disturbs matching.
    #[must_use]
    pub fn with_tokio_trade_channel(
        sender: tokio::sync::mpsc::UnboundedSender<TradeResult>,
    ) -> Self {
        let listener: TradeListener = Arc::new(move |trade: &TradeResult| {
            if let Err(send_error) = sender.send(trade.clone()) {
                error!(
                    "Failed to forward trade for {}: {}",
                    trade.symbol, send_error
                );
            }
        });
        Self::with_trade_listener(listener)
    }

    /// Creates the book for `symbol` if it does not exist yet.
    pub fn add_book(&self, symbol: &str) {
        self.books.entry(symbol.to_string()).or_insert_with(|| {
            info!("Added order book for symbol: {}", symbol);
            self.new_book(symbol)
        });
    }

    /// Runs `f` against the book for `symbol`, if one exists.
    ///
    /// Does not create the book.
    pub fn with_book<R>(&self, symbol: &str, f: impl FnOnce(&OrderBook) -> R) -> Option<R> {
        self.books.get(symbol).map(|book| f(book.value()))
    }

    /// Runs `f` against the book for `symbol`, creating it first if needed.
    pub fn with_book_mut<R>(&self, symbol: &str, f: impl FnOnce(&mut OrderBook) -> R) -> R {
        let mut book = self.ensure_book(symbol);
        f(book.value_mut())
    }

    /// Applies one normalized feed event.
    ///
    /// Add events default to the limit order type and the current time when
    /// the payload omits them. Trade events report the aggressor; the book
    /// is matched on the opposite side. The book for the event's symbol is
    /// created on demand.
    ///
    /// # Errors
    /// Returns an error when a field required by the event kind is missing,
    /// when the kind is unknown, or when the book rejects the mutation.
    pub fn process_order_event(&self, event: OrderEvent) -> Result<EventOutcome, OrderBookError> {
        match event.kind {
            EventKind::Add => {
                let order_id = event.order_id.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Add,
                    field: "order_id",
                })?;
                let price = event.price.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Add,
                    field: "price",
                })?;
                let size = event.size.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Add,
                    field: "size",
                })?;
                let side = event.side.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Add,
                    field: "side",
                })?;
                let order_type = event.order_type.unwrap_or(OrderType::Limit);

                let order = match event.timestamp {
                    Some(timestamp) => {
                        Order::with_timestamp(order_id, price, size, side, order_type, timestamp)
                    }
                    None => Order::with_id(order_id, price, size, side, order_type),
                };

                self.with_book_mut(&event.symbol, |book| book.add_order(order))?;
                Ok(EventOutcome::Applied)
            }
            EventKind::Cancel => {
                let order_id = event.order_id.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Cancel,
                    field: "order_id",
                })?;

                self.with_book_mut(&event.symbol, |book| book.cancel_order(order_id))?;
                Ok(EventOutcome::Applied)
            }
            EventKind::Update => {
                let order_id = event.order_id.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Update,
                    field: "order_id",
                })?;
                let size = event.size.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Update,
                    field: "size",
                })?;

                self.with_book_mut(&event.symbol, |book| book.update_order(order_id, size))?;
                Ok(EventOutcome::Applied)
            }
            EventKind::Trade => {
                let size = event.size.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Trade,
                    field: "size",
                })?;
                let aggressor = event.aggressor_side.ok_or(OrderBookError::MissingEventField {
                    kind: EventKind::Trade,
                    field: "aggressor_side",
                })?;

                // Feed trades name the aggressor; the resting side consumed
                // by the match is the opposite one.
                let result = self.with_book_mut(&event.symbol, |book| {
                    book.match_market_order(aggressor.opposite(), size)
                });
                Ok(EventOutcome::Traded(result))
            }
            EventKind::Unknown => Err(OrderBookError::UnknownEventKind {
                kind: event.kind.to_string(),
            }),
        }
    }

    /// Replaces the book for the payload's symbol with a fresh one built
    /// from the snapshot levels.
    ///
    /// Every level becomes one synthesized limit order. A sequence or
    /// timestamp supplied by the payload overrides the values accrued while
    /// rebuilding; otherwise the rebuilt book keeps them. Existing state for
    /// the symbol is discarded, never merged.
    ///
    /// # Errors
    /// Returns an error if a synthesized order is rejected.
    pub fn process_snapshot(&self, payload: SnapshotPayload) -> Result<(), OrderBookError> {
        let bid_levels = payload.bids.len();
        let ask_levels = payload.asks.len();

        let mut book = self.new_book(&payload.symbol);

        for (price, size) in payload.bids {
            book.add_order(Order::new(price, size, Side::Buy, OrderType::Limit))?;
        }
        for (price, size) in payload.asks {
            book.add_order(Order::new(price, size, Side::Sell, OrderType::Limit))?;
        }

        if let Some(sequence) = payload.sequence {
            book.sequence = sequence;
        }
        if let Some(timestamp) = payload.timestamp {
            book.last_update_time = timestamp;
        }

        info!(
            "Applied snapshot for {}: {} bid levels, {} ask levels",
            payload.symbol, bid_levels, ask_levels
        );
        self.books.insert(payload.symbol, book);
        Ok(())
    }

    /// Executes a market order against the book for `symbol`, creating it
    /// first if needed.
    pub fn submit_market_order(&self, symbol: &str, side: Side, size: Decimal) -> MarketOrderResult {
        self.with_book_mut(symbol, |book| book.match_market_order(side, size))
    }

    /// Snapshot of the book for `symbol`, or an empty snapshot when no book
    /// exists.
    ///
    /// Does not create the book.
    #[must_use]
    pub fn book_snapshot(&self, symbol: &str, depth: usize) -> OrderBookSnapshot {
        match self.books.get(symbol) {
            Some(book) => book.snapshot(depth),
            None => OrderBookSnapshot {
                symbol: symbol.to_string(),
                timestamp: current_time_millis(),
                sequence: 0,
                bids: Vec::new(),
                asks: Vec::new(),
            },
        }
    }

    /// All symbols with a book, in arbitrary order.
    #[must_use]
    pub fn symbols(&self) -> Vec<String> {
        self.books.iter().map(|entry| entry.key().clone()).collect()
    }

    /// Whether a book exists for `symbol`.
    #[must_use]
    pub fn has_book(&self, symbol: &str) -> bool {
        self.books.contains_key(symbol)
    }

    /// Number of managed books.
    #[must_use]
    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    fn ensure_book(&self, symbol: &str) -> RefMut<'_, String, OrderBook> {
        self.books
            .entry(symbol.to_string())
            .or_insert_with(|| self.new_book(symbol))
    }

    fn new_book(&self, symbol: &str) -> OrderBook {
        match &self.trade_listener {
            Some(listener) => OrderBook::with_trade_listener(symbol, Arc::clone(listener)),
            None => OrderBook::new(symbol),
        }
    }
}

impl Default for OrderBookManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for OrderBookManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderBookManager")
            .field("book_count", &self.book_count())
            .field("has_trade_listener", &self.trade_listener.is_some())
            .finish()
    }
}
