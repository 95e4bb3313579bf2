//! Prelude module that re-exports commonly used types and traits.
//!
//! This module provides a convenient way to import the most commonly used
//! types, traits, and functions from the lob-engine crate. Instead of
//! importing each type individually, you can use:
//!
//! ```rust
//! use lob_engine::prelude::*;
//! ```
//!
//! This will import all the essential types needed for working with the order book.

// Core order book types
pub use crate::orderbook::OrderBook;
pub use crate::orderbook::OrderBookError;
pub use crate::orderbook::manager::{EventOutcome, OrderBookManager};

// Order types and enums
pub use crate::orderbook::level::PriceLevel;
pub use crate::orderbook::order::{Order, OrderId, OrderStatus, OrderType, Side};

// Feed event types
pub use crate::orderbook::events::{EventKind, OrderEvent, SnapshotPayload};

// Matching types
pub use crate::orderbook::matching::MarketOrderResult;

// Snapshot types
pub use crate::orderbook::snapshot::{
    EnrichedSnapshot, LevelSnapshot, MetricFlags, OrderBookSnapshot, SnapshotPackage,
};

// Analytics types
pub use crate::orderbook::analytics::depth::{LiquidityMetrics, MarketDepthReport};
pub use crate::orderbook::analytics::metrics::{BasicMetrics, ImbalanceMetrics};
pub use crate::orderbook::analytics::signals::{OverallSignal, Signal, SignalKind, SignalReport};
pub use crate::orderbook::analytics::timeseries::{
    MetricsRecord, TimeSeriesAnalytics, TimeSeriesMetrics,
};

// Trade-related types
pub use crate::orderbook::trade::{TradeListener, TradeResult};

// Utility functions
pub use crate::utils::current_time_millis;
