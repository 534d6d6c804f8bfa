/// All configuration loaded from environment variables at startup.
/// Missing required variables cause an immediate panic with a clear message.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON file holding the historical bar series
    /// (an array of `Bar` objects with indicator columns).
    pub series_path: String,

    /// Starting account balance for the simulation.
    pub initial_balance: f64,

    /// Strategy parameter file (TOML).
    pub strategy_config_path: String,

    /// Where to write the detailed results JSON. `None` = don't persist.
    pub results_path: Option<String>,

    /// Sweep definition file (TOML). When set, the binary runs a parameter
    /// sweep instead of a single backtest.
    pub sweep_config_path: Option<String>,
}

impl Config {
    /// Load all configuration from environment variables.
    /// Loads `.env` if present. Panics on any missing required variable.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore error if .env not present

        Config {
            series_path: required_env("SERIES_PATH"),
            initial_balance: optional_env("INITIAL_BALANCE")
                .and_then(|v| v.parse().ok())
                .unwrap_or(10_000.0),
            strategy_config_path: optional_env("STRATEGY_CONFIG_PATH")
                .unwrap_or_else(|| "config/strategy.toml".to_string()),
            results_path: optional_env("RESULTS_PATH"),
            sweep_config_path: optional_env("SWEEP_CONFIG_PATH"),
        }
    }
}

fn required_env(key: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| {
        panic!("Required environment variable '{key}' is not set. Check your .env file.")
    })
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}
