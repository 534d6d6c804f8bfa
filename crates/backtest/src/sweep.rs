use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;

use common::{BacktestOutcome, Bar, Result};
use serde::{Deserialize, Serialize};
use strategy::StrategyParams;
use tracing::info;

use crate::simulator::BacktestSimulator;

/// A parameter grid to sweep (TOML).
///
/// Whole-series backtest runs share no mutable state, so they are the one
/// legitimate parallelism opportunity: each candidate runs as an independent
/// simulation on its own worker thread.
///
/// Example `config/sweep.toml`:
/// ```toml
/// stop_loss_pct = [0.02, 0.03, 0.05]
/// fib_lookback = [50, 100, 200]
/// parallelism = 4
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SweepConfig {
    /// Candidate stop-loss fractions. Empty = keep the base value.
    #[serde(default)]
    pub stop_loss_pct: Vec<f64>,
    /// Candidate swing lookback windows. Empty = keep the base value.
    #[serde(default)]
    pub fib_lookback: Vec<usize>,
    /// Worker thread count. Defaults to available parallelism.
    pub parallelism: Option<usize>,
}

impl SweepConfig {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path)
            .unwrap_or_else(|e| panic!("Failed to read sweep config at '{path}': {e}"));
        toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Failed to parse sweep config at '{path}': {e}"))
    }

    /// Cartesian product of the candidate values over the base parameters.
    pub fn candidates(&self, base: &StrategyParams) -> Vec<StrategyParams> {
        let stops: Vec<f64> = if self.stop_loss_pct.is_empty() {
            vec![base.stop_loss_pct]
        } else {
            self.stop_loss_pct.clone()
        };
        let lookbacks: Vec<usize> = if self.fib_lookback.is_empty() {
            vec![base.fib_lookback]
        } else {
            self.fib_lookback.clone()
        };

        let mut grid = Vec::with_capacity(stops.len() * lookbacks.len());
        for &stop_loss_pct in &stops {
            for &fib_lookback in &lookbacks {
                grid.push(StrategyParams {
                    stop_loss_pct,
                    fib_lookback,
                    ..base.clone()
                });
            }
        }
        grid
    }
}

/// One sweep run: the parameters it used and what the simulation produced.
#[derive(Debug, Clone, Serialize)]
pub struct SweepEntry {
    pub params: StrategyParams,
    pub outcome: BacktestOutcome,
    pub total_pnl_percent: f64,
}

/// Run every candidate parameter set against the same read-only series and
/// return the results sorted by total return, best first.
///
/// Workers pull candidate indexes from a shared counter; each run owns its
/// own tracker, trade log and trajectory.
pub fn run_sweep(
    series: &[Bar],
    initial_balance: f64,
    base: &StrategyParams,
    sweep: &SweepConfig,
) -> Result<Vec<SweepEntry>> {
    let candidates = sweep.candidates(base);
    let workers = sweep
        .parallelism
        .or_else(|| thread::available_parallelism().ok().map(|n| n.get()))
        .unwrap_or(1)
        .clamp(1, candidates.len().max(1));

    info!(
        candidates = candidates.len(),
        workers, "starting parameter sweep"
    );

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel::<Result<SweepEntry>>();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            let candidates = &candidates;
            scope.spawn(move || loop {
                let idx = next.fetch_add(1, Ordering::SeqCst);
                let Some(params) = candidates.get(idx) else {
                    break;
                };
                let entry = BacktestSimulator::new(params.clone())
                    .run(series, initial_balance)
                    .map(|outcome| SweepEntry {
                        params: params.clone(),
                        total_pnl_percent: (outcome.final_balance - initial_balance)
                            / initial_balance,
                        outcome,
                    });
                if tx.send(entry).is_err() {
                    break;
                }
            });
        }
    });
    drop(tx);

    let mut entries = Vec::with_capacity(candidates.len());
    for result in rx {
        entries.push(result?);
    }

    // Ties break on the parameters so the leaderboard order is stable
    // across runs regardless of worker scheduling.
    entries.sort_by(|a, b| {
        b.total_pnl_percent
            .partial_cmp(&a.total_pnl_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| {
                a.params
                    .stop_loss_pct
                    .partial_cmp(&b.params.stop_loss_pct)
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .then_with(|| a.params.fib_lookback.cmp(&b.params.fib_lookback))
    });
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn bar(i: usize, close: f64) -> Bar {
        Bar {
            timestamp: DateTime::from_timestamp(3600 * i as i64, 0).unwrap(),
            open: close,
            high: close + 2.0,
            low: close - 2.0,
            close,
            volume: 1.0,
            ema_fast: Some(close + 2.0),
            ema_mid: Some(close),
            ema_slow: Some(close - 2.0),
            macd_line: Some(1.0),
            macd_signal: Some(0.5),
            rsi: Some(50.0),
            adx: Some(30.0),
        }
    }

    #[test]
    fn candidates_form_the_cartesian_product() {
        let base = StrategyParams::default();
        let sweep = SweepConfig {
            stop_loss_pct: vec![0.02, 0.03],
            fib_lookback: vec![50, 100, 200],
            parallelism: None,
        };
        let grid = sweep.candidates(&base);
        assert_eq!(grid.len(), 6);
        assert!(grid
            .iter()
            .all(|p| p.rsi_overbought == base.rsi_overbought));
    }

    #[test]
    fn empty_axes_fall_back_to_base_values() {
        let base = StrategyParams::default();
        let sweep = SweepConfig {
            stop_loss_pct: vec![],
            fib_lookback: vec![],
            parallelism: None,
        };
        let grid = sweep.candidates(&base);
        assert_eq!(grid.len(), 1);
        assert_eq!(grid[0].stop_loss_pct, base.stop_loss_pct);
        assert_eq!(grid[0].fib_lookback, base.fib_lookback);
    }

    #[test]
    fn sweep_matches_individual_runs() {
        let series: Vec<Bar> = (0..60)
            .map(|i| bar(i, 100.0 + (i as f64 * 0.7).sin() * 10.0))
            .collect();
        let base = StrategyParams::default();
        let sweep = SweepConfig {
            stop_loss_pct: vec![0.01, 0.03, 0.10],
            fib_lookback: vec![20, 100],
            parallelism: Some(2),
        };

        let entries = run_sweep(&series, 10_000.0, &base, &sweep).unwrap();
        assert_eq!(entries.len(), 6);

        // Leaderboard order: best total return first.
        for pair in entries.windows(2) {
            assert!(pair[0].total_pnl_percent >= pair[1].total_pnl_percent);
        }

        // Each entry reproduces a standalone run with the same parameters.
        for entry in &entries {
            let standalone = BacktestSimulator::new(entry.params.clone())
                .run(&series, 10_000.0)
                .unwrap();
            assert_eq!(entry.outcome, standalone);
        }
    }
}
