//! # In-Memory Limit Order Book Engine
//!
//! A limit order book implementation written in Rust. This crate maintains per-symbol
//! books of resting limit orders, executes market orders against them with strict
//! price-time priority, and derives market microstructure analytics from both the
//! current book state and its recorded history.
//!
//! ## Key Features
//!
//! - **Price-Time Priority Matching**: Market orders sweep the opposite side of the
//!   book best price first, FIFO within each price level, with partial fills and
//!   volume-weighted average execution price reporting.
//!
//! - **Full Order Lifecycle**: Add, cancel and resize resting limit orders. Size
//!   updates target total size, preserve queue position and reject reductions below
//!   the already filled quantity.
//!
//! - **Feed Event Processing**: A normalized event model (`add`, `cancel`, `update`,
//!   `trade`) plus exchange snapshot payloads allow books to be driven directly from
//!   a market data feed and rebuilt from authoritative state.
//!
//! - **Multi-Book Management**: [`OrderBookManager`] routes events to per-symbol
//!   books behind a concurrent map and forwards every execution to a shared trade
//!   listener, with `std` and Tokio channel adapters.
//!
//! - **Microstructure Analytics**: Volume and order-count imbalance, depth-weighted
//!   pressure, cumulative depth profiles, simulated price impact curves, liquidity
//!   concentration and resiliency measures.
//!
//! - **Signal Generation**: Rule-based trading signals derived from book state, and
//!   time-series analytics (volatility, trends, autocorrelation, mean reversion) over
//!   a bounded metrics history.
//!
//! - **Verifiable Snapshots**: Top-N depth snapshots, checksummed snapshot packages
//!   for persistence and transfer, and enriched snapshots with selectable
//!   pre-computed metrics.
//!
//! ## Design Goals
//!
//! 1. **Correctness**: Every mutation keeps level aggregates, the order index and
//!    the book sequence consistent; failed operations leave no trace.
//! 2. **Determinism**: Matching and analytics are pure functions of book state, so
//!    identical event streams produce identical books and identical metrics.
//! 3. **Exact Prices**: Prices and sizes are `rust_decimal::Decimal` throughout the
//!    book; floating point appears only in derived analytics.
//! 4. **Observability**: Book mutations and trade routing are traced via the
//!    `tracing` ecosystem.
//!
//! ## Use Cases
//!
//! - **Trading Systems**: Book-building component for feed handlers and execution
//!   gateways
//! - **Market Simulation**: Back-testing environment with realistic matching and
//!   impact modelling
//! - **Research**: Platform for studying market microstructure, order flow and
//!   liquidity dynamics
//! - **Educational**: Reference implementation of price-time priority matching and
//!   book analytics
//!
//! ## Quick Start
//!
//! ```rust
//! use lob_engine::prelude::*;
//! use rust_decimal::Decimal;
//!
//! let mut book = OrderBook::new("BTC/USD");
//!
//! let bid = Order::new(
//!     Decimal::new(9990, 2),
//!     Decimal::TEN,
//!     Side::Buy,
//!     OrderType::Limit,
//! );
//! let ask = Order::new(
//!     Decimal::new(10010, 2),
//!     Decimal::TEN,
//!     Side::Sell,
//!     OrderType::Limit,
//! );
//! book.add_order(bid).unwrap();
//! book.add_order(ask).unwrap();
//!
//! assert_eq!(book.mid_price(), Decimal::new(10000, 2));
//!
//! // A market buy lifts the resting ask.
//! let result = book.match_market_order(Side::Buy, Decimal::new(4, 0));
//! assert!(result.is_complete);
//! assert_eq!(result.avg_price, Decimal::new(10010, 2));
//! ```
//!
//! ## Analytics Overview
//!
//! The analytics layer is split by horizon:
//!
//! - [`BasicMetrics`] and [`ImbalanceMetrics`] summarize the current book in a
//!   single pass (spread, mid, volumes, imbalance measures).
//! - [`MarketDepthReport`] and [`LiquidityMetrics`] describe the shape of the book:
//!   cumulative depth ladders, simulated impact curves and liquidity concentration
//!   around the mid price.
//! - [`SignalReport`] condenses book state into directional and liquidity signals
//!   with strengths and a combined overall reading.
//! - [`TimeSeriesAnalytics`] records [`MetricsRecord`] rows over time and computes
//!   volatility, trends, autocorrelation and mean-reversion indicators across the
//!   retained window.

pub mod orderbook;

pub mod prelude;
mod utils;

pub use orderbook::analytics::depth::{
    DepthLevel, ImpactPoint, LiquidityMetrics, MarketDepthReport,
};
pub use orderbook::analytics::metrics::{BasicMetrics, ImbalanceMetrics};
pub use orderbook::analytics::signals::{OverallSignal, Signal, SignalKind, SignalReport};
pub use orderbook::analytics::timeseries::{
    DEFAULT_MAX_HISTORY, MetricsRecord, TimeSeriesAnalytics, TimeSeriesMetrics,
};
pub use orderbook::events::{EventKind, OrderEvent, SnapshotPayload};
pub use orderbook::level::PriceLevel;
pub use orderbook::manager::{EventOutcome, OrderBookManager};
pub use orderbook::matching::MarketOrderResult;
pub use orderbook::order::{Order, OrderId, OrderStatus, OrderType, Side};
pub use orderbook::snapshot::{
    EnrichedSnapshot, LevelSnapshot, MetricFlags, OrderBookSnapshot, SNAPSHOT_FORMAT_VERSION,
    SnapshotPackage,
};
pub use orderbook::trade::{TradeListener, TradeResult};
pub use orderbook::{OrderBook, OrderBookError};
pub use utils::current_time_millis;
