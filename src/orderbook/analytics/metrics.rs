//! Point-in-time scalar metrics: spreads, volumes and imbalance measures

use serde::{Deserialize, Serialize};

use crate::orderbook::book::OrderBook;
use crate::orderbook::order::Side;

use super::{level_pairs, to_f64};

/// Scalar book metrics at one instant.
///
/// Prices and volumes are converted to `f64`; an empty side reports zero for
/// its best price and volume.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BasicMetrics {
    /// Midpoint of best bid and best ask, zero when either side is empty
    pub mid_price: f64,
    /// Best ask minus best bid, zero when either side is empty
    pub spread: f64,
    /// Spread divided by mid price, zero when mid is zero
    pub relative_spread: f64,
    /// Total resting size across all bid levels
    pub bid_volume: f64,
    /// Total resting size across all ask levels
    pub ask_volume: f64,
    /// Number of resting bid orders
    pub bid_order_count: usize,
    /// Number of resting ask orders
    pub ask_order_count: usize,
    /// `(bid_volume - ask_volume) / (bid_volume + ask_volume)`
    pub volume_imbalance: f64,
    /// Same ratio over order counts
    pub order_count_imbalance: f64,
    /// Best bid price, zero when the bid side is empty
    pub best_bid_price: f64,
    /// Size resting at the best bid
    pub best_bid_volume: f64,
    /// Best ask price, zero when the ask side is empty
    pub best_ask_price: f64,
    /// Size resting at the best ask
    pub best_ask_volume: f64,
    /// Imbalance of the two best-level volumes
    pub best_level_imbalance: f64,
}

/// The imbalance family of metrics, including the depth-weighted variant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImbalanceMetrics {
    /// Imbalance of total resting volume
    pub volume_imbalance: f64,
    /// Imbalance of resting order counts
    pub order_count_imbalance: f64,
    /// Imbalance of the best-level volumes
    pub best_level_imbalance: f64,
    /// Imbalance of populated price-level counts
    pub level_count_imbalance: f64,
    /// Imbalance of each side's volume-weighted distance from mid.
    /// Positive when bid depth sits further from mid than ask depth.
    pub weighted_imbalance: f64,
}

/// `(bid - ask) / (bid + ask)`, zero when the denominator is not positive.
fn imbalance(bid: f64, ask: f64) -> f64 {
    let total = bid + ask;
    if total > 0.0 { (bid - ask) / total } else { 0.0 }
}

impl OrderBook {
    /// Computes the basic scalar metrics for the current book state.
    #[must_use]
    pub fn basic_metrics(&self) -> BasicMetrics {
        let mid_price = to_f64(self.mid_price());
        let spread = to_f64(self.spread());
        let relative_spread = if mid_price > 0.0 {
            spread / mid_price
        } else {
            0.0
        };

        let bid_volume = to_f64(self.total_bid_volume());
        let ask_volume = to_f64(self.total_ask_volume());
        let bid_order_count = self.bid_order_count();
        let ask_order_count = self.ask_order_count();

        let (best_bid_price, best_bid_volume) = self
            .best_bid()
            .map_or((0.0, 0.0), |(price, size)| (to_f64(price), to_f64(size)));
        let (best_ask_price, best_ask_volume) = self
            .best_ask()
            .map_or((0.0, 0.0), |(price, size)| (to_f64(price), to_f64(size)));

        BasicMetrics {
            mid_price,
            spread,
            relative_spread,
            bid_volume,
            ask_volume,
            bid_order_count,
            ask_order_count,
            volume_imbalance: imbalance(bid_volume, ask_volume),
            order_count_imbalance: imbalance(bid_order_count as f64, ask_order_count as f64),
            best_bid_price,
            best_bid_volume,
            best_ask_price,
            best_ask_volume,
            best_level_imbalance: imbalance(best_bid_volume, best_ask_volume),
        }
    }

    /// Computes the imbalance metric family for the current book state.
    ///
    /// The weighted imbalance compares each side's volume-weighted average
    /// distance from mid (`mid - price` for bids, `price - mid` for asks):
    /// a positive value means bid liquidity carries more depth away from mid
    /// than ask liquidity does.
    #[must_use]
    pub fn imbalance_metrics(&self) -> ImbalanceMetrics {
        let bid_volume = to_f64(self.total_bid_volume());
        let ask_volume = to_f64(self.total_ask_volume());
        let best_bid_volume = self.best_bid().map_or(0.0, |(_, size)| to_f64(size));
        let best_ask_volume = self.best_ask().map_or(0.0, |(_, size)| to_f64(size));

        ImbalanceMetrics {
            volume_imbalance: imbalance(bid_volume, ask_volume),
            order_count_imbalance: imbalance(
                self.bid_order_count() as f64,
                self.ask_order_count() as f64,
            ),
            best_level_imbalance: imbalance(best_bid_volume, best_ask_volume),
            level_count_imbalance: imbalance(
                self.bid_level_count() as f64,
                self.ask_level_count() as f64,
            ),
            weighted_imbalance: self.weighted_imbalance(bid_volume, ask_volume),
        }
    }

    fn weighted_imbalance(&self, bid_volume: f64, ask_volume: f64) -> f64 {
        let mid = to_f64(self.mid_price());
        if mid <= 0.0 {
            return 0.0;
        }

        let mut bid_distance = 0.0;
        if bid_volume > 0.0 {
            for (price, size) in level_pairs(self, Side::Buy) {
                bid_distance += (mid - price) * size / bid_volume;
            }
        }
        let mut ask_distance = 0.0;
        if ask_volume > 0.0 {
            for (price, size) in level_pairs(self, Side::Sell) {
                ask_distance += (price - mid) * size / ask_volume;
            }
        }

        let total_distance = bid_distance + ask_distance;
        if total_distance > 0.0 {
            (bid_distance - ask_distance) / total_distance
        } else {
            0.0
        }
    }
}
