use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One OHLCV time step with its precomputed indicator columns.
///
/// Indicator fields are `None` when upstream never produced a value for that
/// bar (warm-up rows) and are also treated as missing when non-finite. The
/// core performs no indicator math itself — these columns arrive aligned to
/// each bar from the data-acquisition layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,

    // Indicator columns (EMA 12/26/50 in the reference configuration).
    pub ema_fast: Option<f64>,
    pub ema_mid: Option<f64>,
    pub ema_slow: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
}

/// Normalize an indicator column: `Some(NaN)` and other non-finite values
/// read as missing.
pub fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl Bar {
    /// True when every indicator column required for an entry decision is
    /// present and finite.
    pub fn has_full_indicators(&self) -> bool {
        [
            self.ema_fast,
            self.ema_mid,
            self.ema_slow,
            self.macd_line,
            self.macd_signal,
            self.rsi,
            self.adx,
        ]
        .iter()
        .all(|v| finite(*v).is_some())
    }
}

/// A completed round trip, recorded when a long position closes.
/// Immutable once created; indexes refer to positions in the input series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_index: usize,
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub exit_index: usize,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    /// Fractional return, e.g. -0.031 for a 3.1% loss.
    pub pnl_percent: f64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.pnl_percent > 0.0
    }
}

/// Everything a single backtest run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    /// Closed trades in chronological order. A position still open at the
    /// last bar is not force-closed and does not appear here.
    pub trades: Vec<Trade>,
    pub final_balance: f64,
    /// Account balance after each closed trade, seeded with the initial
    /// balance as the first point.
    pub trajectory: Vec<f64>,
}
