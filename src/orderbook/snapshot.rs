//! Point-in-time book snapshots with checksum-validated packaging

use bitflags::bitflags;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::trace;

use crate::utils::current_time_millis;

use super::analytics::depth::{LiquidityMetrics, MarketDepthReport};
use super::analytics::metrics::{BasicMetrics, ImbalanceMetrics};
use super::analytics::signals::SignalReport;
use super::book::OrderBook;
use super::error::OrderBookError;
use super::level::PriceLevel;

/// One aggregated price level inside a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    /// Level price
    pub price: Decimal,
    /// Combined unfilled size resting at the level
    pub size: Decimal,
    /// Number of orders queued at the level
    pub order_count: usize,
}

/// A snapshot of the order book state at a specific point in time.
///
/// Levels are stored best-first: bids descending by price, asks ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderBookSnapshot {
    /// The symbol this book trades
    pub symbol: String,

    /// When the snapshot was taken (milliseconds since epoch)
    pub timestamp: u64,

    /// Book sequence number at snapshot time
    pub sequence: u64,

    /// Bid levels, best first
    pub bids: Vec<LevelSnapshot>,

    /// Ask levels, best first
    pub asks: Vec<LevelSnapshot>,
}

impl OrderBookSnapshot {
    /// Best bid price and size, if any bids were captured.
    #[must_use]
    pub fn best_bid(&self) -> Option<(Decimal, Decimal)> {
        self.bids.first().map(|level| (level.price, level.size))
    }

    /// Best ask price and size, if any asks were captured.
    #[must_use]
    pub fn best_ask(&self) -> Option<(Decimal, Decimal)> {
        self.asks.first().map(|level| (level.price, level.size))
    }

    /// Midpoint of the best bid and ask; zero when either side is empty.
    #[must_use]
    pub fn mid_price(&self) -> Decimal {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => (bid + ask) / Decimal::TWO,
            _ => Decimal::ZERO,
        }
    }

    /// Best ask minus best bid; zero when either side is empty.
    #[must_use]
    pub fn spread(&self) -> Decimal {
        match (self.best_bid(), self.best_ask()) {
            (Some((bid, _)), Some((ask, _))) => ask - bid,
            _ => Decimal::ZERO,
        }
    }

    /// Combined size of all captured bid levels.
    #[must_use]
    pub fn total_bid_volume(&self) -> Decimal {
        self.bids.iter().map(|level| level.size).sum()
    }

    /// Combined size of all captured ask levels.
    #[must_use]
    pub fn total_ask_volume(&self) -> Decimal {
        self.asks.iter().map(|level| level.size).sum()
    }
}

/// Format version used for checksum-enabled snapshots.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Wrapper that provides checksum validation for [`OrderBookSnapshot`]
/// instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotPackage {
    /// Version of the snapshot schema for forward compatibility.
    pub version: u32,
    /// Snapshot payload.
    pub snapshot: OrderBookSnapshot,
    /// Hex-encoded SHA-256 checksum of the serialized snapshot.
    pub checksum: String,
}

impl SnapshotPackage {
    /// Creates a package computing the checksum of the snapshot contents.
    ///
    /// # Errors
    /// Returns an error if the snapshot cannot be serialized.
    pub fn new(snapshot: OrderBookSnapshot) -> Result<Self, OrderBookError> {
        let checksum = Self::compute_checksum(&snapshot)?;

        Ok(Self {
            version: SNAPSHOT_FORMAT_VERSION,
            snapshot,
            checksum,
        })
    }

    /// Serializes the package to JSON.
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, OrderBookError> {
        serde_json::to_string(self).map_err(|error| OrderBookError::SerializationError {
            message: error.to_string(),
        })
    }

    /// Deserializes a package from JSON.
    ///
    /// # Errors
    /// Returns an error if the payload is not valid package JSON.
    pub fn from_json(data: &str) -> Result<Self, OrderBookError> {
        serde_json::from_str(data).map_err(|error| OrderBookError::DeserializationError {
            message: error.to_string(),
        })
    }

    /// Validates the schema version and checksum.
    ///
    /// # Errors
    /// Returns an error when the version is unsupported or the checksum does
    /// not match the snapshot contents.
    pub fn validate(&self) -> Result<(), OrderBookError> {
        if self.version != SNAPSHOT_FORMAT_VERSION {
            return Err(OrderBookError::UnsupportedVersion {
                version: self.version,
                expected: SNAPSHOT_FORMAT_VERSION,
            });
        }

        let computed = Self::compute_checksum(&self.snapshot)?;
        if computed != self.checksum {
            return Err(OrderBookError::ChecksumMismatch {
                expected: self.checksum.clone(),
                actual: computed,
            });
        }

        Ok(())
    }

    /// Consumes the package and returns the validated snapshot.
    ///
    /// # Errors
    /// Returns the same errors as [`SnapshotPackage::validate`].
    pub fn into_snapshot(self) -> Result<OrderBookSnapshot, OrderBookError> {
        self.validate()?;
        Ok(self.snapshot)
    }

    fn compute_checksum(snapshot: &OrderBookSnapshot) -> Result<String, OrderBookError> {
        let payload =
            serde_json::to_vec(snapshot).map_err(|error| OrderBookError::SerializationError {
                message: error.to_string(),
            })?;

        let mut hasher = Sha256::new();
        hasher.update(payload);

        let checksum_bytes = hasher.finalize();
        Ok(format!("{checksum_bytes:x}"))
    }
}

bitflags! {
    /// Flags for selecting which analytics to attach to an enriched snapshot
    ///
    /// Use these flags to calculate only the metrics you need. Multiple flags
    /// can be combined using bitwise OR.
    ///
    /// # Examples
    /// ```
    /// use lob_engine::MetricFlags;
    ///
    /// // Headline metrics plus the depth report
    /// let flags = MetricFlags::BASIC | MetricFlags::DEPTH;
    ///
    /// // Everything
    /// let flags = MetricFlags::ALL;
    /// ```
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MetricFlags: u32 {
        /// Headline metrics: mid, spread, volumes and top-of-book imbalance
        const BASIC = 1 << 0;

        /// Cumulative depth levels and price-impact curves
        const DEPTH = 1 << 1;

        /// Near-mid depth bands and resiliency
        const LIQUIDITY = 1 << 2;

        /// The imbalance family, including the distance-weighted variant
        const IMBALANCE = 1 << 3;

        /// Rule-based trading signals
        const SIGNALS = 1 << 4;

        /// All analytics
        const ALL = Self::BASIC.bits() | Self::DEPTH.bits()
                  | Self::LIQUIDITY.bits() | Self::IMBALANCE.bits() | Self::SIGNALS.bits();
    }
}

/// A snapshot bundled with pre-calculated analytics.
///
/// Attaching the analytics at capture time keeps them consistent with the
/// captured levels; computing them later against a live book could observe a
/// different state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichedSnapshot {
    /// The captured book levels
    pub snapshot: OrderBookSnapshot,

    /// Headline metrics, when requested
    pub basic: Option<BasicMetrics>,

    /// Depth report, when requested
    pub depth: Option<MarketDepthReport>,

    /// Liquidity measures, when requested
    pub liquidity: Option<LiquidityMetrics>,

    /// Imbalance family, when requested
    pub imbalance: Option<ImbalanceMetrics>,

    /// Signal report, when requested
    pub signals: Option<SignalReport>,
}

impl OrderBook {
    /// Captures the top `depth` levels of each side.
    #[must_use]
    pub fn snapshot(&self, depth: usize) -> OrderBookSnapshot {
        trace!("Creating snapshot of {} with depth {}", self.symbol, depth);

        let bids = self
            .bids
            .values()
            .take(depth)
            .map(level_snapshot)
            .collect();
        let asks = self
            .asks
            .values()
            .take(depth)
            .map(level_snapshot)
            .collect();

        OrderBookSnapshot {
            symbol: self.symbol.clone(),
            timestamp: current_time_millis(),
            sequence: self.sequence,
            bids,
            asks,
        }
    }

    /// Captures a snapshot together with the analytics selected by `flags`.
    ///
    /// The depth report probes the same `depth` as the captured levels.
    ///
    /// # Examples
    /// ```
    /// use lob_engine::prelude::*;
    /// use rust_decimal_macros::dec;
    ///
    /// let mut book = OrderBook::new("BTC/USD");
    /// book.add_order(Order::new(dec!(100), dec!(10), Side::Buy, OrderType::Limit)).unwrap();
    /// book.add_order(Order::new(dec!(101), dec!(10), Side::Sell, OrderType::Limit)).unwrap();
    ///
    /// let enriched = book.enriched_snapshot(10, MetricFlags::BASIC | MetricFlags::IMBALANCE);
    /// assert!(enriched.basic.is_some());
    /// assert!(enriched.signals.is_none());
    /// ```
    #[must_use]
    pub fn enriched_snapshot(&self, depth: usize, flags: MetricFlags) -> EnrichedSnapshot {
        let snapshot = self.snapshot(depth);

        let basic = if flags.contains(MetricFlags::BASIC) {
            Some(self.basic_metrics())
        } else {
            None
        };

        let depth_report = if flags.contains(MetricFlags::DEPTH) {
            Some(self.market_depth(depth))
        } else {
            None
        };

        let liquidity = if flags.contains(MetricFlags::LIQUIDITY) {
            Some(self.liquidity_metrics())
        } else {
            None
        };

        let imbalance = if flags.contains(MetricFlags::IMBALANCE) {
            Some(self.imbalance_metrics())
        } else {
            None
        };

        let signals = if flags.contains(MetricFlags::SIGNALS) {
            Some(self.trading_signals())
        } else {
            None
        };

        EnrichedSnapshot {
            snapshot,
            basic,
            depth: depth_report,
            liquidity,
            imbalance,
            signals,
        }
    }
}

fn level_snapshot(level: &PriceLevel) -> LevelSnapshot {
    LevelSnapshot {
        price: level.price(),
        size: level.total_size(),
        order_count: level.order_count(),
    }
}
