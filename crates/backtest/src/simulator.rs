use common::{BacktestOutcome, Bar, Result};
use strategy::{evaluate_entry, evaluate_exit, StrategyParams};
use tracing::{debug, info, warn};

use crate::position::{PositionState, PositionTracker};

/// Replays a historical series bar-by-bar, driving the position state
/// machine from the signal evaluator and recording closed trades.
///
/// Strictly sequential and synchronous: at step `i` the evaluator only ever
/// sees `&series[..=i]`, so look-ahead is structurally impossible. Fills
/// happen at the triggering bar's close. Given the same series and initial
/// balance the output is bit-for-bit identical on every run.
pub struct BacktestSimulator {
    params: StrategyParams,
}

impl BacktestSimulator {
    pub fn new(params: StrategyParams) -> Self {
        Self { params }
    }

    /// Run the full simulation.
    ///
    /// An empty series, or one where no bar ever has the full indicator set,
    /// yields an empty trade list and the initial balance — a valid (if
    /// uninteresting) result, not an error. A position still open at the
    /// last bar is left open and excluded from the closed-trade statistics.
    pub fn run(&self, series: &[Bar], initial_balance: f64) -> Result<BacktestOutcome> {
        let mut tracker = PositionTracker::new();
        let mut trades = Vec::new();
        let mut balance = initial_balance;
        let mut trajectory = vec![initial_balance];

        // Skip the indicator warm-up rows at the head of the series.
        let Some(start) = series.iter().position(|b| b.has_full_indicators()) else {
            debug!(bars = series.len(), "no bar has a full indicator set — empty backtest");
            return Ok(BacktestOutcome {
                trades,
                final_balance: balance,
                trajectory,
            });
        };

        if series.len() < self.params.fib_lookback {
            warn!(
                bars = series.len(),
                lookback = self.params.fib_lookback,
                "series shorter than configured lookback — swing levels degrade to available data"
            );
        }

        for i in start..series.len() {
            // The causal prefix: bars [0..=i], never anything beyond.
            let visible = &series[..=i];

            match tracker.state() {
                PositionState::Flat => {
                    let eval = evaluate_entry(visible, &self.params);
                    if eval.signal {
                        let entry_price = series[i].close;
                        tracker.open(entry_price, i);
                        info!(index = i, price = entry_price, "entered long");
                        debug!(?eval, "entry conditions");
                    }
                }
                PositionState::Long { entry_price, .. } => {
                    let eval = evaluate_exit(visible, entry_price, &self.params)?;
                    if eval.signal {
                        if let Some(trade) = tracker.close(series, i) {
                            balance *= 1.0 + trade.pnl_percent;
                            trajectory.push(balance);
                            info!(
                                index = i,
                                exit_price = trade.exit_price,
                                pnl_percent = trade.pnl_percent,
                                reasons = ?eval.reasons(),
                                "closed long"
                            );
                            trades.push(trade);
                        }
                    }
                }
            }
        }

        if let PositionState::Long {
            entry_price,
            entry_index,
        } = tracker.state()
        {
            info!(
                entry_index,
                entry_price, "position still open at the last bar — not force-closed"
            );
        }

        Ok(BacktestOutcome {
            trades,
            final_balance: balance,
            trajectory,
        })
    }
}
