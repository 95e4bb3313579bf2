//! Order book implementation covering price levels, matching, feed events and
//! market analytics.

/// Microstructure analytics derived from current and historical book state.
pub mod analytics;
pub mod book;
pub mod error;
/// Normalized feed events and exchange snapshot payloads.
pub mod events;
pub mod level;
/// Multi-book management with centralized trade event routing.
pub mod manager;
pub mod matching;
pub mod order;
pub mod snapshot;
mod tests;
/// Enhanced trade result that includes symbol information
pub mod trade;

pub use analytics::depth::{DepthLevel, ImpactPoint, LiquidityMetrics, MarketDepthReport};
pub use analytics::metrics::{BasicMetrics, ImbalanceMetrics};
pub use analytics::signals::{OverallSignal, Signal, SignalKind, SignalReport};
pub use analytics::timeseries::{
    DEFAULT_MAX_HISTORY, MetricsRecord, TimeSeriesAnalytics, TimeSeriesMetrics,
};
pub use book::OrderBook;
pub use error::OrderBookError;
pub use events::{EventKind, OrderEvent, SnapshotPayload};
pub use level::PriceLevel;
pub use manager::{EventOutcome, OrderBookManager};
pub use matching::MarketOrderResult;
pub use order::{Order, OrderId, OrderStatus, OrderType, Side};
pub use snapshot::{
    EnrichedSnapshot, LevelSnapshot, MetricFlags, OrderBookSnapshot, SNAPSHOT_FORMAT_VERSION,
    SnapshotPackage,
};
pub use trade::{TradeListener, TradeResult};
