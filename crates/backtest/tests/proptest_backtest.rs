use backtest::BacktestSimulator;
use chrono::DateTime;
use common::Bar;
use proptest::prelude::*;
use strategy::StrategyParams;

/// Build a bar whose indicator columns are plausibly derived from its close.
/// Bars before the warm-up index carry no indicators at all.
fn synth_bar(i: usize, close: f64, warmup: usize) -> Bar {
    let with_indicators = i >= warmup;
    let indicator = |v: f64| if with_indicators { Some(v) } else { None };
    Bar {
        timestamp: DateTime::from_timestamp(3600 * i as i64, 0).unwrap(),
        open: close,
        high: close * 1.01,
        low: close * 0.99,
        close,
        volume: 1.0,
        ema_fast: indicator(close * 1.002),
        ema_mid: indicator(close),
        ema_slow: indicator(close * 0.998),
        macd_line: indicator(1.0),
        macd_signal: indicator(0.5),
        rsi: indicator(50.0),
        adx: indicator(30.0),
    }
}

proptest! {
    /// The simulator must complete without panicking on arbitrary finite
    /// price paths, and the structural invariants of its output must hold.
    #[test]
    fn backtest_invariants_on_random_series(
        prices in prop::collection::vec(1.0f64..1_000.0, 0..150),
        warmup in 0usize..20,
    ) {
        let series: Vec<Bar> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| synth_bar(i, p, warmup))
            .collect();

        let sim = BacktestSimulator::new(StrategyParams::default());
        let outcome = sim.run(&series, 10_000.0).unwrap();

        // One trajectory point per closed trade, plus the seed.
        prop_assert_eq!(outcome.trajectory.len(), outcome.trades.len() + 1);
        prop_assert_eq!(outcome.trajectory[0], 10_000.0);

        // Every Long → Flat transition produced exactly one well-formed trade.
        for trade in &outcome.trades {
            prop_assert!(trade.exit_index > trade.entry_index);
            prop_assert!(trade.exit_index < series.len());
            prop_assert!(trade.entry_price > 0.0);
            prop_assert!(trade.pnl_percent > -1.0);
        }

        // Closed trades never overlap: each entry starts after the previous exit.
        for pair in outcome.trades.windows(2) {
            prop_assert!(pair[1].entry_index > pair[0].exit_index);
        }

        // The final balance is the compounded product of the trade returns.
        let compounded = outcome
            .trades
            .iter()
            .fold(10_000.0, |bal, t| bal * (1.0 + t.pnl_percent));
        prop_assert!((outcome.final_balance - compounded).abs() < 1e-6);
    }

    /// Two runs over the same series are bit-for-bit identical.
    #[test]
    fn backtest_is_idempotent(
        prices in prop::collection::vec(1.0f64..1_000.0, 0..100),
    ) {
        let series: Vec<Bar> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| synth_bar(i, p, 5))
            .collect();

        let sim = BacktestSimulator::new(StrategyParams::default());
        let first = sim.run(&series, 10_000.0).unwrap();
        let second = sim.run(&series, 10_000.0).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Report-level bounds hold for whatever the simulator produces.
    #[test]
    fn win_rate_is_always_a_probability(
        prices in prop::collection::vec(1.0f64..1_000.0, 0..150),
    ) {
        let series: Vec<Bar> = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| synth_bar(i, p, 5))
            .collect();

        let sim = BacktestSimulator::new(StrategyParams::default());
        let outcome = sim.run(&series, 10_000.0).unwrap();
        let report = report::summarize(
            &outcome.trades,
            &outcome.trajectory,
            10_000.0,
            outcome.final_balance,
        );

        prop_assert!((0.0..=1.0).contains(&report.win_rate));
        prop_assert!((0.0..=1.0).contains(&report.max_drawdown));
        prop_assert_eq!(report.total_trades, outcome.trades.len());
        prop_assert_eq!(
            report.winning_trades + report.losing_trades,
            report.total_trades
        );
    }
}
