use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use backtest::{run_sweep, BacktestSimulator, SweepConfig};
use common::{Bar, Config};
use report::summarize;
use strategy::{strategy_summary, StrategyParams};

fn main() -> anyhow::Result<()> {
    // ── Logging ──────────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    // ── Config ────────────────────────────────────────────────────────────────
    let cfg = Config::from_env();
    info!(series = %cfg.series_path, balance = cfg.initial_balance, "shadowtest starting");

    let params = if std::path::Path::new(&cfg.strategy_config_path).exists() {
        StrategyParams::load(&cfg.strategy_config_path)
    } else {
        info!(path = %cfg.strategy_config_path, "no strategy config found — using defaults");
        StrategyParams::default()
    };

    // ── Series ────────────────────────────────────────────────────────────────
    let series = load_series(&cfg.series_path)
        .with_context(|| format!("failed to load series from '{}'", cfg.series_path))?;
    info!(bars = series.len(), "series loaded");

    // ── Sweep mode ────────────────────────────────────────────────────────────
    if let Some(sweep_path) = &cfg.sweep_config_path {
        let sweep = SweepConfig::load(sweep_path);
        let entries = run_sweep(&series, cfg.initial_balance, &params, &sweep)?;

        println!(
            "{:<10} {:<10} {:>8} {:>10} {:>10}",
            "stop_loss", "lookback", "trades", "return", "drawdown"
        );
        for entry in &entries {
            let summary = summarize(
                &entry.outcome.trades,
                &entry.outcome.trajectory,
                cfg.initial_balance,
                entry.outcome.final_balance,
            );
            println!(
                "{:<10.4} {:<10} {:>8} {:>9.2}% {:>9.2}%",
                entry.params.stop_loss_pct,
                entry.params.fib_lookback,
                summary.total_trades,
                summary.total_pnl_percent * 100.0,
                summary.max_drawdown * 100.0,
            );
        }
        return Ok(());
    }

    // ── Single backtest ───────────────────────────────────────────────────────
    let outcome = BacktestSimulator::new(params.clone()).run(&series, cfg.initial_balance)?;
    let report = summarize(
        &outcome.trades,
        &outcome.trajectory,
        cfg.initial_balance,
        outcome.final_balance,
    );
    println!("{report}");

    if let Some(path) = &cfg.results_path {
        let latest = strategy_summary(&series, &params, None);
        let results = serde_json::json!({
            "report": report,
            "trades": outcome.trades,
            "trajectory": outcome.trajectory,
            "latest": latest,
        });
        std::fs::write(path, serde_json::to_string_pretty(&results)?)
            .with_context(|| format!("failed to write results to '{path}'"))?;
        info!(path = %path, "detailed results saved");
    }

    Ok(())
}

/// Read an already-augmented bar series (a JSON array of bars with their
/// indicator columns) produced by the data-acquisition layer.
fn load_series(path: &str) -> common::Result<Vec<Bar>> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}
