//! Microstructure analytics computed from book state
//!
//! Everything in this module is a pure read of the book: metrics, depth
//! profiles and signals never mutate it. Book quantities are `Decimal`;
//! analytics work in `f64` because ratios and regressions do not need exact
//! decimal arithmetic.

/// Depth profiles and price-impact estimation.
pub mod depth;
/// Scalar metrics: spreads, volumes, imbalances.
pub mod metrics;
/// Threshold-rule trading signals.
pub mod signals;
/// Bounded metric history and trend/volatility statistics.
pub mod timeseries;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::book::OrderBook;
use super::order::Side;

/// Lossy Decimal to f64 conversion used at the analytics boundary.
pub(crate) fn to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

/// All of one side's levels as (price, size) f64 pairs, best price first.
pub(crate) fn level_pairs(book: &OrderBook, side: Side) -> Vec<(f64, f64)> {
    book.get_price_levels(side, usize::MAX)
        .into_iter()
        .map(|(price, size)| (to_f64(price), to_f64(size)))
        .collect()
}
