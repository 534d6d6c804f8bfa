use serde::{Deserialize, Serialize};

/// Strategy parameters (TOML).
///
/// Example `config/strategy.toml`:
/// ```toml
/// fib_lookback = 100
/// rsi_overbought = 68.0
/// adx_threshold = 25.0
/// stop_loss_pct = 0.03
/// ```
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StrategyParams {
    /// Trailing window length for swing high/low detection.
    #[serde(default = "default_fib_lookback")]
    pub fib_lookback: usize,
    /// RSI ceiling — no entries at or above this level.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,
    /// Minimum ADX for the trend to count as established.
    #[serde(default = "default_adx_threshold")]
    pub adx_threshold: f64,
    /// Fractional loss from entry that forces an exit (0.03 = 3%).
    #[serde(default = "default_stop_loss_pct")]
    pub stop_loss_pct: f64,
}

fn default_fib_lookback() -> usize {
    100
}

fn default_rsi_overbought() -> f64 {
    68.0
}

fn default_adx_threshold() -> f64 {
    25.0
}

fn default_stop_loss_pct() -> f64 {
    0.03
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            fib_lookback: default_fib_lookback(),
            rsi_overbought: default_rsi_overbought(),
            adx_threshold: default_adx_threshold(),
            stop_loss_pct: default_stop_loss_pct(),
        }
    }
}

impl StrategyParams {
    /// Load from a TOML file. Exits process on error.
    pub fn load(path: &str) -> Self {
        let content = std::fs::read_to_string(path).unwrap_or_else(|e| {
            panic!("Failed to read strategy config at '{path}': {e}")
        });
        toml::from_str(&content).unwrap_or_else(|e| {
            panic!("Failed to parse strategy config at '{path}': {e}")
        })
    }
}
