//! Bounded-history time-series analytics over sampled book metrics

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::orderbook::book::OrderBook;
use crate::utils::current_time_millis;

use super::signals::{OverallSignal, Signal, SignalKind, SignalReport, combine_signals};

/// History bound used by [`TimeSeriesAnalytics::default`].
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// One sampled observation of a book's headline metrics.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    /// Sample time in milliseconds since the Unix epoch
    pub timestamp: u64,
    /// Mid price at sample time
    pub mid_price: f64,
    /// Absolute spread
    pub spread: f64,
    /// Spread divided by mid
    pub relative_spread: f64,
    /// Total resting bid size
    pub bid_volume: f64,
    /// Total resting ask size
    pub ask_volume: f64,
    /// Overall volume imbalance
    pub volume_imbalance: f64,
    /// Distance-weighted imbalance
    pub weighted_imbalance: f64,
    /// Combined size within 5% of mid
    pub depth_5pct: f64,
    /// Liquidity concentration measure
    pub resiliency: f64,
}

impl MetricsRecord {
    /// Samples the book's current metrics, stamped with the current time.
    #[must_use]
    pub fn from_book(book: &OrderBook) -> Self {
        let basic = book.basic_metrics();
        let imbalance = book.imbalance_metrics();
        let liquidity = book.liquidity_metrics();

        MetricsRecord {
            timestamp: current_time_millis(),
            mid_price: basic.mid_price,
            spread: basic.spread,
            relative_spread: basic.relative_spread,
            bid_volume: basic.bid_volume,
            ask_volume: basic.ask_volume,
            volume_imbalance: imbalance.volume_imbalance,
            weighted_imbalance: imbalance.weighted_imbalance,
            depth_5pct: liquidity.depth_5pct,
            resiliency: liquidity.resiliency,
        }
    }
}

/// Statistics computed over the recorded history.
///
/// Volatilities and trends need at least two records; the autocorrelation
/// and mean-reversion measures need more than five. Below those thresholds
/// the corresponding fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeSeriesMetrics {
    /// Sample std of mid-price returns, scaled by sqrt(history length)
    pub price_volatility: f64,
    /// Sample std of first differences of the relative spread
    pub spread_volatility: f64,
    /// Least-squares slope of volume imbalance per sample
    pub imbalance_trend: f64,
    /// r-squared of the imbalance trend fit
    pub imbalance_trend_significance: f64,
    /// Least-squares slope of 5%-depth per sample
    pub liquidity_trend: f64,
    /// r-squared of the liquidity trend fit
    pub liquidity_trend_significance: f64,
    /// Lag-1 autocorrelation of volume imbalance
    pub imbalance_autocorrelation: f64,
    /// AR(1) reversion strength of the mid price, `1 - slope`
    pub mean_reversion: f64,
}

/// Rolling window of [`MetricsRecord`] samples with derived statistics.
///
/// The window is bounded: recording beyond `max_history` evicts the oldest
/// sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeSeriesAnalytics {
    history: VecDeque<MetricsRecord>,
    max_history: usize,
}

impl Default for TimeSeriesAnalytics {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl TimeSeriesAnalytics {
    /// Creates an empty window holding at most `max_history` samples.
    #[must_use]
    pub fn new(max_history: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(max_history),
            max_history,
        }
    }

    /// Samples `book` and appends the record to the window.
    pub fn record(&mut self, book: &OrderBook) {
        self.push(MetricsRecord::from_book(book));
    }

    /// Appends an already-built record, evicting the oldest beyond the bound.
    pub fn push(&mut self, record: MetricsRecord) {
        self.history.push_back(record);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Number of recorded samples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Whether no samples have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// The configured history bound.
    #[must_use]
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// The most recent sample, if any.
    #[must_use]
    pub fn latest(&self) -> Option<&MetricsRecord> {
        self.history.back()
    }

    /// The recorded samples, oldest first.
    #[must_use]
    pub fn history(&self) -> &VecDeque<MetricsRecord> {
        &self.history
    }

    /// Computes the derived statistics over the current window.
    #[must_use]
    pub fn time_series_metrics(&self) -> TimeSeriesMetrics {
        let n = self.history.len();

        let mids: Vec<f64> = self.history.iter().map(|r| r.mid_price).collect();
        let spreads: Vec<f64> = self.history.iter().map(|r| r.relative_spread).collect();
        let imbalances: Vec<f64> = self.history.iter().map(|r| r.volume_imbalance).collect();
        let depths: Vec<f64> = self.history.iter().map(|r| r.depth_5pct).collect();

        let mut metrics = TimeSeriesMetrics {
            price_volatility: 0.0,
            spread_volatility: 0.0,
            imbalance_trend: 0.0,
            imbalance_trend_significance: 0.0,
            liquidity_trend: 0.0,
            liquidity_trend_significance: 0.0,
            imbalance_autocorrelation: 0.0,
            mean_reversion: 0.0,
        };

        if n > 1 {
            metrics.price_volatility = sample_std(&pct_changes(&mids)) * (n as f64).sqrt();
            metrics.spread_volatility = sample_std(&diffs(&spreads));

            let (slope, significance) = linear_trend(&imbalances);
            metrics.imbalance_trend = slope;
            metrics.imbalance_trend_significance = significance;

            let (slope, significance) = linear_trend(&depths);
            metrics.liquidity_trend = slope;
            metrics.liquidity_trend_significance = significance;
        }

        if n > 5 {
            metrics.imbalance_autocorrelation = lag_autocorrelation(&imbalances);
            metrics.mean_reversion = mean_reversion_strength(&mids);
        }

        metrics
    }

    /// Evaluates the time-series signal rules.
    ///
    /// With fewer than five samples the report is empty and neutral with zero
    /// confidence. Otherwise five rules are checked: imbalance trend,
    /// liquidity trend, mean reversion after a recent move, the latest
    /// volume imbalance, and price volatility.
    #[must_use]
    pub fn time_series_signals(&self) -> SignalReport {
        if self.history.len() < 5 {
            return SignalReport {
                signals: Vec::new(),
                overall: OverallSignal {
                    kind: SignalKind::Neutral,
                    strength: 0.5,
                    confidence: 0.0,
                },
            };
        }

        let metrics = self.time_series_metrics();
        let mut signals = Vec::new();

        let trend = metrics.imbalance_trend;
        if trend.abs() > 0.01 && metrics.imbalance_trend_significance > 0.3 {
            if trend > 0.0 {
                signals.push(Signal {
                    kind: SignalKind::Buy,
                    strength: (trend * 50.0).min(1.0),
                    reason: format!("Increasing buy pressure with trend of {trend:.4}"),
                });
            } else {
                signals.push(Signal {
                    kind: SignalKind::Sell,
                    strength: (trend.abs() * 50.0).min(1.0),
                    reason: format!("Increasing sell pressure with trend of {trend:.4}"),
                });
            }
        }

        let liquidity_trend = metrics.liquidity_trend;
        if liquidity_trend.abs() > 0.01 && metrics.liquidity_trend_significance > 0.3 {
            if liquidity_trend > 0.0 {
                signals.push(Signal {
                    kind: SignalKind::HighLiquidity,
                    strength: (liquidity_trend * 50.0).min(1.0),
                    reason: format!("Increasing liquidity with trend of {liquidity_trend:.4}"),
                });
            } else {
                signals.push(Signal {
                    kind: SignalKind::LowLiquidity,
                    strength: (liquidity_trend.abs() * 50.0).min(1.0),
                    reason: format!("Decreasing liquidity with trend of {liquidity_trend:.4}"),
                });
            }
        }

        if metrics.mean_reversion > 0.5 {
            let recent: Vec<f64> = self
                .history
                .iter()
                .skip(self.history.len() - 5)
                .map(|r| r.mid_price)
                .collect();
            if let (Some(&base), Some(&last)) = (recent.first(), recent.last()) {
                // A zero base price has no meaningful return; skip the rule.
                if base > 0.0 {
                    let recent_change = last / base - 1.0;
                    let change_pct = recent_change.abs() * 100.0;
                    if recent_change > 0.005 {
                        signals.push(Signal {
                            kind: SignalKind::Sell,
                            strength: (metrics.mean_reversion * recent_change * 100.0).min(1.0),
                            reason: format!(
                                "Mean reversion signal after {change_pct:.2}% price increase"
                            ),
                        });
                    } else if recent_change < -0.005 {
                        signals.push(Signal {
                            kind: SignalKind::Buy,
                            strength: (metrics.mean_reversion * recent_change.abs() * 100.0)
                                .min(1.0),
                            reason: format!(
                                "Mean reversion signal after {change_pct:.2}% price decrease"
                            ),
                        });
                    }
                }
            }
        }

        let latest_imbalance = self.history.back().map_or(0.0, |r| r.volume_imbalance);
        if latest_imbalance.abs() > 0.2 {
            if latest_imbalance > 0.0 {
                signals.push(Signal {
                    kind: SignalKind::Buy,
                    strength: (latest_imbalance * 2.0).min(1.0),
                    reason: format!(
                        "Current buy pressure with imbalance of {latest_imbalance:.2}"
                    ),
                });
            } else {
                signals.push(Signal {
                    kind: SignalKind::Sell,
                    strength: (latest_imbalance.abs() * 2.0).min(1.0),
                    reason: format!(
                        "Current sell pressure with imbalance of {latest_imbalance:.2}"
                    ),
                });
            }
        }

        let volatility = metrics.price_volatility;
        let volatility_pct = volatility * 100.0;
        if volatility > 0.02 {
            signals.push(Signal {
                kind: SignalKind::HighVolatility,
                strength: (volatility * 10.0).min(1.0),
                reason: format!("High price volatility of {volatility_pct:.2}%"),
            });
        } else if volatility < 0.005 {
            signals.push(Signal {
                kind: SignalKind::LowVolatility,
                strength: ((0.01 - volatility) * 200.0).min(1.0),
                reason: format!("Low price volatility of {volatility_pct:.2}%"),
            });
        }

        let overall = combine_signals(&signals);
        SignalReport { signals, overall }
    }
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator); zero below two values.
fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let avg = mean(values);
    let variance = values
        .iter()
        .map(|value| (value - avg).powi(2))
        .sum::<f64>()
        / (values.len() - 1) as f64;
    variance.sqrt()
}

/// Step-over-step returns, skipping steps with a zero base.
fn pct_changes(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .filter(|window| window[0] != 0.0)
        .map(|window| (window[1] - window[0]) / window[0])
        .collect()
}

fn diffs(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|window| window[1] - window[0])
        .collect()
}

/// Least-squares slope and r-squared of `y` against its sample index.
fn linear_trend(y: &[f64]) -> (f64, f64) {
    let x: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    linregress(&x, y).unwrap_or((0.0, 0.0))
}

/// Least-squares fit of `y` on `x`, returning `(slope, r_squared)`.
///
/// `None` when `x` carries no variance. A flat `y` yields r-squared of zero.
fn linregress(x: &[f64], y: &[f64]) -> Option<(f64, f64)> {
    let n = x.len().min(y.len());
    if n < 2 {
        return None;
    }

    let x_mean = mean(&x[..n]);
    let y_mean = mean(&y[..n]);

    let mut ss_xx = 0.0;
    let mut ss_yy = 0.0;
    let mut ss_xy = 0.0;
    for i in 0..n {
        let dx = x[i] - x_mean;
        let dy = y[i] - y_mean;
        ss_xx += dx * dx;
        ss_yy += dy * dy;
        ss_xy += dx * dy;
    }

    if ss_xx == 0.0 {
        return None;
    }
    let slope = ss_xy / ss_xx;
    let r_squared = if ss_yy > 0.0 {
        (ss_xy * ss_xy) / (ss_xx * ss_yy)
    } else {
        0.0
    };
    Some((slope, r_squared))
}

/// Lag-1 autocorrelation as `sum(y[i] * y[i+1]) / sum(y[i]^2)` (uncentered).
fn lag_autocorrelation(y: &[f64]) -> f64 {
    let denominator: f64 = y.iter().map(|value| value * value).sum();
    if denominator == 0.0 {
        return 0.0;
    }
    let numerator: f64 = y.windows(2).map(|window| window[0] * window[1]).sum();
    numerator / denominator
}

/// AR(1) persistence of the price series: regresses each price on its
/// predecessor and returns `1 - slope`. Constant prices yield zero.
fn mean_reversion_strength(prices: &[f64]) -> f64 {
    if prices.len() < 2 {
        return 0.0;
    }
    let lagged = &prices[..prices.len() - 1];
    let current = &prices[1..];
    match linregress(lagged, current) {
        Some((slope, _)) => 1.0 - slope,
        None => 0.0,
    }
}
