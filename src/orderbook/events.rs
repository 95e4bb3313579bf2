//! Feed boundary payloads: discrete order events and full book snapshots
//!
//! These are the serde shapes the engine consumes from an external feed. An
//! unknown event kind string deserializes to [`EventKind::Unknown`] so that
//! dispatch can reject it explicitly instead of failing at the parse step.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::order::{OrderId, OrderType, Side};

/// Kind of a discrete order event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    /// A new order enters the book
    Add,
    /// An existing order is canceled by id
    Cancel,
    /// An existing order changes its total size
    Update,
    /// A trade print, applied as an implicit market order
    Trade,
    /// Fallback for kinds this engine does not dispatch
    #[serde(other)]
    Unknown,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKind::Add => write!(f, "add"),
            EventKind::Cancel => write!(f, "cancel"),
            EventKind::Update => write!(f, "update"),
            EventKind::Trade => write!(f, "trade"),
            EventKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// A discrete order event from the feed.
///
/// Which optional fields are required depends on `kind`:
///
/// - `add`: `order_id`, `price`, `size`, `side` (`order_type` defaults to
///   limit, `timestamp` to the current time)
/// - `cancel`: `order_id`
/// - `update`: `order_id`, `size`
/// - `trade`: `size`, `aggressor_side`
///
/// Missing required fields fail dispatch with
/// [`OrderBookError::MissingEventField`](super::error::OrderBookError).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEvent {
    /// Event kind
    pub kind: EventKind,
    /// Symbol the event applies to
    pub symbol: String,
    /// Order id, for lifecycle events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<OrderId>,
    /// Limit price, for `add`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    /// Order size (total for `add`/`update`, traded quantity for `trade`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Decimal>,
    /// Resting side, for `add`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<Side>,
    /// Order type metadata, for `add`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_type: Option<OrderType>,
    /// Side of the aggressor, for `trade`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggressor_side: Option<Side>,
    /// Event time in milliseconds since the Unix epoch
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl OrderEvent {
    /// Builds an `add` event
    #[must_use]
    pub fn add(
        symbol: impl Into<String>,
        order_id: OrderId,
        price: Decimal,
        size: Decimal,
        side: Side,
    ) -> Self {
        Self {
            kind: EventKind::Add,
            symbol: symbol.into(),
            order_id: Some(order_id),
            price: Some(price),
            size: Some(size),
            side: Some(side),
            order_type: Some(OrderType::Limit),
            aggressor_side: None,
            timestamp: None,
        }
    }

    /// Builds a `cancel` event
    #[must_use]
    pub fn cancel(symbol: impl Into<String>, order_id: OrderId) -> Self {
        Self {
            kind: EventKind::Cancel,
            symbol: symbol.into(),
            order_id: Some(order_id),
            price: None,
            size: None,
            side: None,
            order_type: None,
            aggressor_side: None,
            timestamp: None,
        }
    }

    /// Builds an `update` event carrying the new total size
    #[must_use]
    pub fn update(symbol: impl Into<String>, order_id: OrderId, size: Decimal) -> Self {
        Self {
            kind: EventKind::Update,
            symbol: symbol.into(),
            order_id: Some(order_id),
            price: None,
            size: Some(size),
            side: None,
            order_type: None,
            aggressor_side: None,
            timestamp: None,
        }
    }

    /// Builds a `trade` event for an aggressor of the given side
    #[must_use]
    pub fn trade(symbol: impl Into<String>, aggressor_side: Side, size: Decimal) -> Self {
        Self {
            kind: EventKind::Trade,
            symbol: symbol.into(),
            order_id: None,
            price: None,
            size: Some(size),
            side: None,
            order_type: None,
            aggressor_side: Some(aggressor_side),
            timestamp: None,
        }
    }
}

/// A full book snapshot from the feed: flat (price, size) levels per side.
///
/// Applying a snapshot replaces the whole book for the symbol; it is never
/// merged into existing state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotPayload {
    /// Symbol the snapshot applies to
    pub symbol: String,
    /// Bid levels as (price, size) pairs
    pub bids: Vec<(Decimal, Decimal)>,
    /// Ask levels as (price, size) pairs
    pub asks: Vec<(Decimal, Decimal)>,
    /// Exchange timestamp, kept verbatim when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
    /// Exchange sequence number, kept verbatim when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u64>,
}

impl SnapshotPayload {
    /// Builds a payload from level pairs with no exchange timestamp/sequence
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        bids: Vec<(Decimal, Decimal)>,
        asks: Vec<(Decimal, Decimal)>,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            bids,
            asks,
            timestamp: None,
            sequence: None,
        }
    }

    /// Attaches the exchange sequence number
    #[must_use]
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }

    /// Attaches the exchange timestamp
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}
