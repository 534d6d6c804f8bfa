use common::{finite, Bar, Error, Result};
use serde::Serialize;

use crate::config::StrategyParams;
use crate::levels::{derive_retracements, find_levels};

/// Which entry sub-conditions held on the last bar, plus the combined
/// decision. Emitted as a structured record so callers can log which
/// conditions passed; the evaluator itself never logs.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EntryEvaluation {
    /// `ema_fast > ema_mid > ema_slow`.
    pub trend_aligned: bool,
    /// `macd_line > macd_signal`.
    pub momentum_bullish: bool,
    /// RSI below the overbought ceiling.
    pub rsi_headroom: bool,
    /// ADX above the trend-strength threshold.
    pub adx_strong: bool,
    /// Close inside the 50%–61.8% retracement band of the trailing window.
    pub in_retracement_zone: bool,
    /// All of the above (logical AND).
    pub signal: bool,
}

/// Which exit sub-conditions fired, plus the combined decision.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ExitEvaluation {
    /// `ema_fast < ema_mid`.
    pub trend_reversal: bool,
    /// `macd_line < macd_signal`.
    pub momentum_loss: bool,
    /// Close at or below the stop-loss price.
    pub stop_loss: bool,
    /// Any of the above (logical OR).
    pub signal: bool,
}

impl ExitEvaluation {
    /// Names of the conditions that fired, for logging. Several may
    /// co-occur; the exit decision itself is the single `signal` boolean.
    pub fn reasons(&self) -> Vec<&'static str> {
        let mut reasons = Vec::new();
        if self.trend_reversal {
            reasons.push("trend reversal");
        }
        if self.momentum_loss {
            reasons.push("momentum loss");
        }
        if self.stop_loss {
            reasons.push("stop loss");
        }
        reasons
    }
}

/// Evaluate the buy rule against the last bar of a causal prefix.
///
/// Pure: no mutation, no logging. The caller is responsible for passing a
/// prefix with no future data. Any missing or non-finite required indicator
/// yields an all-false evaluation — never buy on incomplete information.
pub fn evaluate_entry(series: &[Bar], params: &StrategyParams) -> EntryEvaluation {
    let Some(last) = series.last() else {
        return EntryEvaluation::default();
    };
    let (
        Some(ema_fast),
        Some(ema_mid),
        Some(ema_slow),
        Some(macd_line),
        Some(macd_signal),
        Some(rsi),
        Some(adx),
    ) = (
        finite(last.ema_fast),
        finite(last.ema_mid),
        finite(last.ema_slow),
        finite(last.macd_line),
        finite(last.macd_signal),
        finite(last.rsi),
        finite(last.adx),
    )
    else {
        return EntryEvaluation::default();
    };
    if !last.close.is_finite() {
        return EntryEvaluation::default();
    }

    let trend_aligned = ema_fast > ema_mid && ema_mid > ema_slow;
    let momentum_bullish = macd_line > macd_signal;
    let rsi_headroom = rsi < params.rsi_overbought;
    let adx_strong = adx > params.adx_threshold;

    // Swing levels over the trailing window ending at the last bar. When
    // unavailable (empty/degenerate window) the condition is false — missing
    // data is not evaluated optimistically.
    let in_retracement_zone = find_levels(series, params.fib_lookback)
        .and_then(|s| derive_retracements(s.swing_high, s.swing_low).ok())
        .map(|retr| retr.fib_618() <= last.close && last.close <= retr.fib_50())
        .unwrap_or(false);

    let signal =
        trend_aligned && momentum_bullish && rsi_headroom && adx_strong && in_retracement_zone;

    EntryEvaluation {
        trend_aligned,
        momentum_bullish,
        rsi_headroom,
        adx_strong,
        in_retracement_zone,
        signal,
    }
}

/// Evaluate the sell rule against the last bar of a causal prefix.
///
/// A non-positive `entry_price` is an invalid-input failure, not a "no exit"
/// result. Missing indicator data yields an all-false evaluation — stay in
/// position rather than force an exit on bad data.
pub fn evaluate_exit(
    series: &[Bar],
    entry_price: f64,
    params: &StrategyParams,
) -> Result<ExitEvaluation> {
    if !entry_price.is_finite() || entry_price <= 0.0 {
        return Err(Error::InvalidInput(format!(
            "entry price must be positive, got {entry_price}"
        )));
    }

    let Some(last) = series.last() else {
        return Ok(ExitEvaluation::default());
    };
    let (Some(ema_fast), Some(ema_mid), Some(macd_line), Some(macd_signal)) = (
        finite(last.ema_fast),
        finite(last.ema_mid),
        finite(last.macd_line),
        finite(last.macd_signal),
    ) else {
        return Ok(ExitEvaluation::default());
    };
    if !last.close.is_finite() {
        return Ok(ExitEvaluation::default());
    }

    let trend_reversal = ema_fast < ema_mid;
    let momentum_loss = macd_line < macd_signal;
    let stop_loss = last.close <= entry_price * (1.0 - params.stop_loss_pct);

    let signal = trend_reversal || momentum_loss || stop_loss;

    Ok(ExitEvaluation {
        trend_reversal,
        momentum_loss,
        stop_loss,
        signal,
    })
}
