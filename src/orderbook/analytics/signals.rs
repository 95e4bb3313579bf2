//! Rule-based trading signals derived from book shape

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::orderbook::book::OrderBook;

/// What a signal is saying about the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    /// Directional pressure toward rising prices
    Buy,
    /// Directional pressure toward falling prices
    Sell,
    /// No clear direction
    Neutral,
    /// Conditions favorable for execution
    HighLiquidity,
    /// Thin or dispersed book
    LowLiquidity,
    /// Elevated price variability
    HighVolatility,
    /// Unusually calm price series
    LowVolatility,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalKind::Buy => write!(f, "buy"),
            SignalKind::Sell => write!(f, "sell"),
            SignalKind::Neutral => write!(f, "neutral"),
            SignalKind::HighLiquidity => write!(f, "high_liquidity"),
            SignalKind::LowLiquidity => write!(f, "low_liquidity"),
            SignalKind::HighVolatility => write!(f, "high_volatility"),
            SignalKind::LowVolatility => write!(f, "low_volatility"),
        }
    }
}

/// One triggered rule with its strength in `[0, 1]` and a human-readable
/// explanation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    /// Signal classification
    pub kind: SignalKind,
    /// Rule strength, capped at 1.0
    pub strength: f64,
    /// Why the rule fired
    pub reason: String,
}

/// Aggregate direction across all triggered signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverallSignal {
    /// Buy, sell or neutral
    pub kind: SignalKind,
    /// Average strength of the winning direction
    pub strength: f64,
    /// Share of directional strength held by the winning side
    pub confidence: f64,
}

/// Triggered signals plus their aggregate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    /// Every rule that fired, in evaluation order
    pub signals: Vec<Signal>,
    /// Combined directional read
    pub overall: OverallSignal,
}

/// Averages buy and sell strengths and picks a direction.
///
/// A direction wins only when its average strength beats the other side and
/// exceeds 0.5; anything else is neutral. Non-directional signals (liquidity,
/// volatility) do not vote.
pub(crate) fn combine_signals(signals: &[Signal]) -> OverallSignal {
    let mut buy_strength = 0.0;
    let mut buy_count = 0usize;
    let mut sell_strength = 0.0;
    let mut sell_count = 0usize;

    for signal in signals {
        match signal.kind {
            SignalKind::Buy => {
                buy_strength += signal.strength;
                buy_count += 1;
            }
            SignalKind::Sell => {
                sell_strength += signal.strength;
                sell_count += 1;
            }
            _ => {}
        }
    }

    let buy_avg = buy_strength / buy_count.max(1) as f64;
    let sell_avg = sell_strength / sell_count.max(1) as f64;
    let total = buy_avg + sell_avg;

    if buy_avg > sell_avg && buy_avg > 0.5 {
        OverallSignal {
            kind: SignalKind::Buy,
            strength: buy_avg,
            confidence: if total > 0.0 { buy_avg / total } else { 0.5 },
        }
    } else if sell_avg > buy_avg && sell_avg > 0.5 {
        OverallSignal {
            kind: SignalKind::Sell,
            strength: sell_avg,
            confidence: if total > 0.0 { sell_avg / total } else { 0.5 },
        }
    } else {
        OverallSignal {
            kind: SignalKind::Neutral,
            strength: 0.5,
            confidence: 0.5,
        }
    }
}

impl OrderBook {
    /// Evaluates the signal rules against the current book state.
    ///
    /// Five rules are checked: overall volume imbalance, distance-weighted
    /// imbalance, relative spread, best-level imbalance, and the share of
    /// volume concentrated within 5% of mid. Each triggered rule contributes
    /// one [`Signal`]; the aggregate direction is computed by
    /// averaging the strengths per direction.
    #[must_use]
    pub fn trading_signals(&self) -> SignalReport {
        let basic = self.basic_metrics();
        let imbalance = self.imbalance_metrics();
        let liquidity = self.liquidity_metrics();

        let mut signals = Vec::new();

        let volume_imbalance = imbalance.volume_imbalance;
        if volume_imbalance > 0.2 {
            signals.push(Signal {
                kind: SignalKind::Buy,
                strength: (volume_imbalance * 2.0).min(1.0),
                reason: format!(
                    "Strong buying pressure with volume imbalance of {volume_imbalance:.2}"
                ),
            });
        } else if volume_imbalance < -0.2 {
            signals.push(Signal {
                kind: SignalKind::Sell,
                strength: (volume_imbalance.abs() * 2.0).min(1.0),
                reason: format!(
                    "Strong selling pressure with volume imbalance of {volume_imbalance:.2}"
                ),
            });
        }

        let weighted_imbalance = imbalance.weighted_imbalance;
        if weighted_imbalance > 0.15 {
            signals.push(Signal {
                kind: SignalKind::Buy,
                strength: (weighted_imbalance * 3.0).min(1.0),
                reason: format!(
                    "Bid side has stronger depth with weighted imbalance of {weighted_imbalance:.2}"
                ),
            });
        } else if weighted_imbalance < -0.15 {
            signals.push(Signal {
                kind: SignalKind::Sell,
                strength: (weighted_imbalance.abs() * 3.0).min(1.0),
                reason: format!(
                    "Ask side has stronger depth with weighted imbalance of {weighted_imbalance:.2}"
                ),
            });
        }

        let relative_spread = basic.relative_spread;
        let spread_bps = relative_spread * 10_000.0;
        if relative_spread < 0.0001 {
            signals.push(Signal {
                kind: SignalKind::HighLiquidity,
                strength: 0.8,
                reason: format!("Very tight spread of {spread_bps:.2} bps indicates high liquidity"),
            });
        } else if relative_spread > 0.001 {
            signals.push(Signal {
                kind: SignalKind::LowLiquidity,
                strength: (relative_spread * 500.0).min(1.0),
                reason: format!("Wide spread of {spread_bps:.2} bps indicates low liquidity"),
            });
        }

        let best_level_imbalance = basic.best_level_imbalance;
        if best_level_imbalance > 0.3 {
            signals.push(Signal {
                kind: SignalKind::Buy,
                strength: (best_level_imbalance * 1.5).min(1.0),
                reason: format!(
                    "Strong buying at the top of the book with imbalance of {best_level_imbalance:.2}"
                ),
            });
        } else if best_level_imbalance < -0.3 {
            signals.push(Signal {
                kind: SignalKind::Sell,
                strength: (best_level_imbalance.abs() * 1.5).min(1.0),
                reason: format!(
                    "Strong selling at the top of the book with imbalance of {best_level_imbalance:.2}"
                ),
            });
        }

        let depth_5pct = liquidity.depth_5pct;
        let total_volume = basic.bid_volume + basic.ask_volume;
        if depth_5pct > 0.8 * total_volume {
            let concentration = depth_5pct / total_volume * 100.0;
            signals.push(Signal {
                kind: SignalKind::HighLiquidity,
                strength: 0.9,
                reason: format!(
                    "High liquidity with {concentration:.1}% of volume within 5% of mid price"
                ),
            });
        } else if depth_5pct < 0.2 * total_volume {
            let concentration = depth_5pct / total_volume * 100.0;
            signals.push(Signal {
                kind: SignalKind::LowLiquidity,
                strength: 0.8,
                reason: format!(
                    "Low liquidity with only {concentration:.1}% of volume within 5% of mid price"
                ),
            });
        }

        let overall = combine_signals(&signals);
        SignalReport { signals, overall }
    }
}
