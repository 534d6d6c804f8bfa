use common::{Bar, Error, Result};
use serde::Serialize;
use tracing::{debug, warn};

/// Extreme high/low over a trailing window — the reference points for
/// retracement levels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SwingLevels {
    pub swing_high: f64,
    pub swing_low: f64,
}

/// The fixed retracement ratios, shallow to deep. Ratio 0.0 maps to the
/// swing high, 1.0 to the swing low.
pub const RETRACEMENT_RATIOS: [f64; 7] = [0.0, 0.236, 0.382, 0.5, 0.618, 0.786, 1.0];

/// Prices interpolated between swing high and swing low at the fixed ratios.
#[derive(Debug, Clone, Serialize)]
pub struct RetracementLevels {
    /// `(ratio, price)` pairs, ordered as [`RETRACEMENT_RATIOS`].
    pub levels: [(f64, f64); 7],
}

impl RetracementLevels {
    /// Price at one of the fixed ratios; `None` for a ratio outside the set.
    pub fn level(&self, ratio: f64) -> Option<f64> {
        self.levels
            .iter()
            .find(|(r, _)| *r == ratio)
            .map(|(_, price)| *price)
    }

    /// The 50% retracement price.
    pub fn fib_50(&self) -> f64 {
        self.levels[3].1
    }

    /// The 61.8% retracement price. Numerically below [`fib_50`]: a higher
    /// ratio means a deeper pullback from the swing high.
    ///
    /// [`fib_50`]: RetracementLevels::fib_50
    pub fn fib_618(&self) -> f64 {
        self.levels[4].1
    }
}

/// Find the swing high/low over the most recent `lookback` bars.
///
/// When fewer than `lookback` bars exist, all available bars are used — a
/// degraded-accuracy mode, not an error. Returns `None` when the window is
/// empty, either extremum is non-finite, or the computed high does not
/// exceed the low (degenerate or corrupt data).
pub fn find_levels(window: &[Bar], lookback: usize) -> Option<SwingLevels> {
    if window.is_empty() {
        debug!("empty window for swing high/low calculation");
        return None;
    }

    if window.len() < lookback {
        debug!(
            available = window.len(),
            requested = lookback,
            "swing window shorter than lookback — using all available bars"
        );
    }
    let start = window.len().saturating_sub(lookback);
    let recent = &window[start..];

    let swing_high = recent.iter().fold(f64::NEG_INFINITY, |acc, b| acc.max(b.high));
    let swing_low = recent.iter().fold(f64::INFINITY, |acc, b| acc.min(b.low));

    if !swing_high.is_finite() || !swing_low.is_finite() {
        warn!("non-finite values in swing high/low calculation");
        return None;
    }

    if swing_high <= swing_low {
        warn!(swing_high, swing_low, "invalid swing levels: high <= low");
        return None;
    }

    Some(SwingLevels { swing_high, swing_low })
}

/// Derive retracement prices from a swing high/low pair.
///
/// `level(r) = swing_high - r * (swing_high - swing_low)`. Fails when
/// `swing_high <= swing_low` or either input is non-positive — both indicate
/// an upstream programming error, not market noise.
pub fn derive_retracements(swing_high: f64, swing_low: f64) -> Result<RetracementLevels> {
    if swing_high <= swing_low {
        return Err(Error::InvalidInput(format!(
            "swing high ({swing_high}) must be greater than swing low ({swing_low})"
        )));
    }
    if swing_high <= 0.0 || swing_low <= 0.0 {
        return Err(Error::InvalidInput(
            "swing high and low must be positive values".to_string(),
        ));
    }

    let range = swing_high - swing_low;
    let mut levels = [(0.0, 0.0); 7];
    for (slot, &ratio) in levels.iter_mut().zip(RETRACEMENT_RATIOS.iter()) {
        *slot = (ratio, swing_high - range * ratio);
    }

    Ok(RetracementLevels { levels })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn bar(i: usize, high: f64, low: f64) -> Bar {
        Bar {
            timestamp: DateTime::from_timestamp(3600 * i as i64, 0).unwrap(),
            open: (high + low) / 2.0,
            high,
            low,
            close: (high + low) / 2.0,
            volume: 1.0,
            ema_fast: None,
            ema_mid: None,
            ema_slow: None,
            macd_line: None,
            macd_signal: None,
            rsi: None,
            adx: None,
        }
    }

    #[test]
    fn find_levels_empty_window_returns_none() {
        assert!(find_levels(&[], 100).is_none());
    }

    #[test]
    fn find_levels_spans_the_window_extremes() {
        let bars = vec![bar(0, 150.0, 140.0), bar(1, 200.0, 180.0), bar(2, 120.0, 100.0)];
        let levels = find_levels(&bars, 100).unwrap();
        assert_eq!(levels.swing_high, 200.0);
        assert_eq!(levels.swing_low, 100.0);
    }

    #[test]
    fn find_levels_respects_lookback() {
        // The extreme high sits outside the 2-bar lookback and must be ignored.
        let bars = vec![bar(0, 500.0, 400.0), bar(1, 200.0, 180.0), bar(2, 120.0, 100.0)];
        let levels = find_levels(&bars, 2).unwrap();
        assert_eq!(levels.swing_high, 200.0);
        assert_eq!(levels.swing_low, 100.0);
    }

    #[test]
    fn find_levels_degenerate_range_returns_none() {
        // All bars at the same price: high == low across the window.
        let bars = vec![bar(0, 100.0, 100.0), bar(1, 100.0, 100.0)];
        assert!(find_levels(&bars, 10).is_none());
    }

    #[test]
    fn find_levels_nan_extremum_returns_none() {
        let mut b = bar(0, 200.0, 100.0);
        b.high = f64::NAN;
        assert!(find_levels(&[b], 10).is_none());
    }

    #[test]
    fn retracement_endpoints_round_trip() {
        let retr = derive_retracements(200.0, 100.0).unwrap();
        assert_eq!(retr.level(0.0), Some(200.0));
        assert_eq!(retr.level(1.0), Some(100.0));
    }

    #[test]
    fn retracement_known_levels() {
        let retr = derive_retracements(200.0, 100.0).unwrap();
        assert!((retr.fib_50() - 150.0).abs() < 1e-9);
        assert!((retr.fib_618() - 138.2).abs() < 1e-9);
        assert!(retr.fib_618() < retr.fib_50());
    }

    #[test]
    fn derive_rejects_inverted_swings() {
        assert!(derive_retracements(100.0, 200.0).is_err());
        assert!(derive_retracements(100.0, 100.0).is_err());
    }

    #[test]
    fn derive_rejects_non_positive_inputs() {
        assert!(derive_retracements(10.0, -5.0).is_err());
        assert!(derive_retracements(0.0, -1.0).is_err());
    }
}
