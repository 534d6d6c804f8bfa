use chrono::{DateTime, Utc};
use common::Bar;
use serde::Serialize;

use crate::config::StrategyParams;
use crate::evaluator::{evaluate_entry, evaluate_exit, EntryEvaluation, ExitEvaluation};
use crate::levels::{derive_retracements, find_levels, RetracementLevels};

/// P&L details for an open position, relative to the latest close.
#[derive(Debug, Clone, Serialize)]
pub struct PositionInfo {
    pub entry_price: f64,
    pub current_price: f64,
    pub pnl_absolute: f64,
    /// Fractional return since entry.
    pub pnl_percent: f64,
    pub stop_loss_price: f64,
}

/// A point-in-time snapshot of the strategy's view of the market: latest
/// indicator values, both decisions, retracement levels, and open-position
/// P&L when an entry price is supplied. Display-oriented — the simulator
/// never consults it.
#[derive(Debug, Clone, Serialize)]
pub struct StrategySummary {
    pub timestamp: Option<DateTime<Utc>>,
    pub close: Option<f64>,
    pub entry: EntryEvaluation,
    pub exit: Option<ExitEvaluation>,
    pub retracements: Option<RetracementLevels>,
    pub position: Option<PositionInfo>,
}

/// Build a [`StrategySummary`] from the latest state of a series.
pub fn strategy_summary(
    series: &[Bar],
    params: &StrategyParams,
    entry_price: Option<f64>,
) -> StrategySummary {
    let last = series.last();
    let close = last.map(|b| b.close).filter(|c| c.is_finite());

    let entry = evaluate_entry(series, params);

    let valid_entry_price = entry_price.filter(|p| p.is_finite() && *p > 0.0);
    let exit = valid_entry_price.and_then(|price| evaluate_exit(series, price, params).ok());

    let retracements = find_levels(series, params.fib_lookback)
        .and_then(|s| derive_retracements(s.swing_high, s.swing_low).ok());

    let position = match (valid_entry_price, close) {
        (Some(entry_price), Some(current_price)) => {
            let pnl_absolute = current_price - entry_price;
            Some(PositionInfo {
                entry_price,
                current_price,
                pnl_absolute,
                pnl_percent: pnl_absolute / entry_price,
                stop_loss_price: entry_price * (1.0 - params.stop_loss_pct),
            })
        }
        _ => None,
    };

    StrategySummary {
        timestamp: last.map(|b| b.timestamp),
        close,
        entry,
        exit,
        retracements,
        position,
    }
}
