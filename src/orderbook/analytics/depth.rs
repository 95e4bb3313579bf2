//! Depth profiles, price-impact estimation and liquidity measures

use serde::{Deserialize, Serialize};

use crate::orderbook::book::OrderBook;
use crate::orderbook::order::Side;

use super::{level_pairs, to_f64};

/// Order sizes probed by the impact curve, as fractions of visible volume.
const IMPACT_FRACTIONS: [f64; 5] = [0.01, 0.05, 0.10, 0.25, 0.50];

/// One price level with its running cumulative size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    /// Level price
    pub price: f64,
    /// Size resting at this level
    pub size: f64,
    /// Cumulative size from the best level through this one
    pub cumulative: f64,
}

/// Price impact of one probe order size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactPoint {
    /// Probe order size
    pub size: f64,
    /// Probe size as a fraction of the report's visible volume
    pub size_fraction: f64,
    /// Fractional deviation of the average execution price from mid
    pub impact: f64,
    /// The same impact expressed in basis points
    pub impact_bps: f64,
}

/// Cumulative depth per side plus impact curves for standard order sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketDepthReport {
    /// Bid levels with cumulative sizes, best first
    pub bids: Vec<DepthLevel>,
    /// Ask levels with cumulative sizes, best first
    pub asks: Vec<DepthLevel>,
    /// Impact curve for buy orders walking the ask side
    pub buy_impact: Vec<ImpactPoint>,
    /// Impact curve for sell orders walking the bid side
    pub sell_impact: Vec<ImpactPoint>,
}

/// How much liquidity rests near the mid and how tightly it clusters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityMetrics {
    /// Combined size of levels within 1% of mid
    pub depth_1pct: f64,
    /// Combined size of levels within 2% of mid
    pub depth_2pct: f64,
    /// Combined size of levels within 5% of mid
    pub depth_5pct: f64,
    /// Size resting at the best bid plus the best ask
    pub liquidity_at_mid: f64,
    /// Inverse of the summed volume-weighted price dispersion of both sides.
    /// Higher values mean liquidity concentrated near the touch.
    pub resiliency: f64,
}

impl OrderBook {
    /// Builds a depth report over the top `levels` price levels per side.
    ///
    /// The impact curves probe both directions at 1%, 5%, 10%, 25% and 50%
    /// of the report's visible volume (both included sides combined).
    #[must_use]
    pub fn market_depth(&self, levels: usize) -> MarketDepthReport {
        let bids = cumulative_levels(self.level_pairs_f64(Side::Buy, levels));
        let asks = cumulative_levels(self.level_pairs_f64(Side::Sell, levels));

        let total_volume: f64 = bids.iter().map(|level| level.size).sum::<f64>()
            + asks.iter().map(|level| level.size).sum::<f64>();

        MarketDepthReport {
            buy_impact: self.impact_curve(Side::Buy, total_volume),
            sell_impact: self.impact_curve(Side::Sell, total_volume),
            bids,
            asks,
        }
    }

    /// Estimates the price impact of a market order without executing it.
    ///
    /// Walks the opposing side best-first accumulating `matched * price`; any
    /// unfilled remainder is priced at the worst level of that side. The
    /// result is the fractional deviation of the average execution price from
    /// mid: positive when the order would move the price against itself.
    ///
    /// Returns zero for non-positive sizes and whenever mid is zero (which
    /// covers the empty-opposing-side case).
    #[must_use]
    pub fn price_impact(&self, side: Side, size: f64) -> f64 {
        if size <= 0.0 {
            return 0.0;
        }
        let mid = to_f64(self.mid_price());
        if mid <= 0.0 {
            return 0.0;
        }

        let levels = match side {
            Side::Buy => level_pairs(self, Side::Sell),
            Side::Sell => level_pairs(self, Side::Buy),
        };

        let mut remaining = size;
        let mut value = 0.0;
        for &(price, level_size) in &levels {
            if remaining <= 0.0 {
                break;
            }
            let matched = remaining.min(level_size);
            value += matched * price;
            remaining -= matched;
        }
        if remaining > 0.0 {
            if let Some(&(worst_price, _)) = levels.last() {
                value += remaining * worst_price;
            }
        }

        let avg_price = value / size;
        match side {
            Side::Buy => (avg_price - mid) / mid,
            Side::Sell => (mid - avg_price) / mid,
        }
    }

    /// Computes near-mid depth bands, touch liquidity and resiliency.
    ///
    /// All fields are zero when mid is zero.
    #[must_use]
    pub fn liquidity_metrics(&self) -> LiquidityMetrics {
        let mid = to_f64(self.mid_price());
        if mid <= 0.0 {
            return LiquidityMetrics {
                depth_1pct: 0.0,
                depth_2pct: 0.0,
                depth_5pct: 0.0,
                liquidity_at_mid: 0.0,
                resiliency: 0.0,
            };
        }

        let liquidity_at_mid = self.best_bid().map_or(0.0, |(_, size)| to_f64(size))
            + self.best_ask().map_or(0.0, |(_, size)| to_f64(size));

        LiquidityMetrics {
            depth_1pct: self.depth_within(mid, mid * 0.01),
            depth_2pct: self.depth_within(mid, mid * 0.02),
            depth_5pct: self.depth_within(mid, mid * 0.05),
            liquidity_at_mid,
            resiliency: self.resiliency(),
        }
    }

    /// Combined size of bids at `price >= mid - range` and asks at
    /// `price <= mid + range`.
    fn depth_within(&self, mid: f64, range: f64) -> f64 {
        let bid_depth: f64 = level_pairs(self, Side::Buy)
            .into_iter()
            .filter(|&(price, _)| price >= mid - range)
            .map(|(_, size)| size)
            .sum();
        let ask_depth: f64 = level_pairs(self, Side::Sell)
            .into_iter()
            .filter(|&(price, _)| price <= mid + range)
            .map(|(_, size)| size)
            .sum();
        bid_depth + ask_depth
    }

    fn resiliency(&self) -> f64 {
        let bids = level_pairs(self, Side::Buy);
        let asks = level_pairs(self, Side::Sell);
        if bids.is_empty() || asks.is_empty() {
            return 0.0;
        }

        let bid_volume: f64 = bids.iter().map(|&(_, size)| size).sum();
        let ask_volume: f64 = asks.iter().map(|&(_, size)| size).sum();
        if bid_volume == 0.0 || ask_volume == 0.0 {
            return 0.0;
        }

        let total_std = weighted_price_std(&bids, bid_volume) + weighted_price_std(&asks, ask_volume);
        if total_std > 0.0 { 1.0 / total_std } else { 0.0 }
    }

    fn impact_curve(&self, side: Side, total_volume: f64) -> Vec<ImpactPoint> {
        IMPACT_FRACTIONS
            .iter()
            .map(|&fraction| {
                let size = total_volume * fraction;
                let impact = self.price_impact(side, size);
                ImpactPoint {
                    size,
                    size_fraction: if total_volume > 0.0 {
                        size / total_volume
                    } else {
                        0.0
                    },
                    impact,
                    impact_bps: impact * 10_000.0,
                }
            })
            .collect()
    }

    /// Top `depth` levels of one side as f64 pairs.
    fn level_pairs_f64(&self, side: Side, depth: usize) -> Vec<(f64, f64)> {
        self.get_price_levels(side, depth)
            .into_iter()
            .map(|(price, size)| (to_f64(price), to_f64(size)))
            .collect()
    }
}

fn cumulative_levels(pairs: Vec<(f64, f64)>) -> Vec<DepthLevel> {
    let mut running = 0.0;
    pairs
        .into_iter()
        .map(|(price, size)| {
            running += size;
            DepthLevel {
                price,
                size,
                cumulative: running,
            }
        })
        .collect()
}

/// Volume-weighted standard deviation of level prices around the side VWAP.
fn weighted_price_std(levels: &[(f64, f64)], total_volume: f64) -> f64 {
    let vwap: f64 = levels
        .iter()
        .map(|&(price, size)| price * size)
        .sum::<f64>()
        / total_volume;
    let variance: f64 = levels
        .iter()
        .map(|&(price, size)| (price - vwap).powi(2) * size)
        .sum::<f64>()
        / total_volume;
    variance.sqrt()
}
