use common::Trade;
use serde::{Deserialize, Serialize};

/// Aggregate performance statistics, computed once from the final trade log
/// and balance trajectory. The fields are the stable contract for any
/// rendering layer; all percentage-like values are fractions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    /// Fraction of trades with positive return; 0 when there are no trades.
    pub win_rate: f64,
    /// Mean return over winning trades; 0 when there are none.
    pub avg_profit: f64,
    /// Mean return over losing trades (return <= 0); 0 when there are none.
    pub avg_loss: f64,
    /// Maximum peak-to-trough decline of the balance trajectory.
    pub max_drawdown: f64,
    pub total_pnl_percent: f64,
    /// Gross profit / gross loss; `None` when there are no losing trades.
    pub profit_factor: Option<f64>,
    /// Sharpe over per-trade returns (mean / stddev * sqrt(n)); 0 with fewer
    /// than two trades or zero variance.
    pub sharpe_ratio: f64,
}

/// Reduce a trade log and balance trajectory into a [`Report`].
///
/// Pure: same inputs, same report. Degenerate inputs (no trades, empty
/// trajectory) produce zeros rather than errors.
pub fn summarize(
    trades: &[Trade],
    trajectory: &[f64],
    initial_balance: f64,
    final_balance: f64,
) -> Report {
    let total_trades = trades.len();
    let winning_trades = trades.iter().filter(|t| t.is_winner()).count();
    let losing_trades = total_trades - winning_trades;

    let win_rate = if total_trades > 0 {
        winning_trades as f64 / total_trades as f64
    } else {
        0.0
    };

    let avg_profit = mean(trades.iter().filter(|t| t.is_winner()).map(|t| t.pnl_percent));
    let avg_loss = mean(trades.iter().filter(|t| !t.is_winner()).map(|t| t.pnl_percent));

    let max_drawdown = max_drawdown(initial_balance, trajectory);

    let total_pnl_percent = if initial_balance > 0.0 {
        (final_balance - initial_balance) / initial_balance
    } else {
        0.0
    };

    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.pnl_percent)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| !t.is_winner())
        .map(|t| t.pnl_percent.abs())
        .sum();
    let profit_factor = (gross_loss > 0.0).then(|| gross_profit / gross_loss);

    Report {
        total_trades,
        winning_trades,
        losing_trades,
        win_rate,
        avg_profit,
        avg_loss,
        max_drawdown,
        total_pnl_percent,
        profit_factor,
        sharpe_ratio: sharpe(trades),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count > 0 {
        sum / count as f64
    } else {
        0.0
    }
}

/// Maximum fractional decline from the running peak, with the initial
/// balance as the first peak candidate.
fn max_drawdown(initial_balance: f64, trajectory: &[f64]) -> f64 {
    let mut peak = initial_balance;
    let mut max_dd: f64 = 0.0;
    for &balance in trajectory {
        if balance > peak {
            peak = balance;
        } else if peak > 0.0 {
            max_dd = max_dd.max((peak - balance) / peak);
        }
    }
    max_dd
}

/// Sharpe ratio over per-trade returns. The core has no fixed bar duration,
/// so no annualization is applied.
fn sharpe(trades: &[Trade]) -> f64 {
    let n = trades.len();
    if n < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.pnl_percent).collect();
    let mean = returns.iter().sum::<f64>() / n as f64;
    let variance =
        returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / (n as f64 - 1.0);
    let std = variance.sqrt();
    if std > 0.0 {
        mean / std * (n as f64).sqrt()
    } else {
        0.0
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let line = "=".repeat(60);
        writeln!(f, "{line}")?;
        writeln!(f, "{:^60}", "BACKTEST RESULTS")?;
        writeln!(f, "{line}")?;
        writeln!(f, "Total Trades:        {}", self.total_trades)?;
        writeln!(f, "Winning Trades:      {}", self.winning_trades)?;
        writeln!(f, "Losing Trades:       {}", self.losing_trades)?;
        writeln!(f, "Win Rate:            {:.1}%", self.win_rate * 100.0)?;
        writeln!(f, "Average Win:         {:+.2}%", self.avg_profit * 100.0)?;
        writeln!(f, "Average Loss:        {:+.2}%", self.avg_loss * 100.0)?;
        writeln!(f, "Max Drawdown:        {:.2}%", self.max_drawdown * 100.0)?;
        writeln!(f, "Total Return:        {:+.2}%", self.total_pnl_percent * 100.0)?;
        match self.profit_factor {
            Some(pf) => writeln!(f, "Profit Factor:       {pf:.2}")?,
            None => writeln!(f, "Profit Factor:       n/a")?,
        }
        writeln!(f, "Sharpe Ratio:        {:.2}", self.sharpe_ratio)?;
        write!(f, "{line}")
    }
}
