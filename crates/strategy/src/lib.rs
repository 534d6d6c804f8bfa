pub mod config;
pub mod evaluator;
pub mod levels;
pub mod summary;

pub use config::StrategyParams;
pub use evaluator::{evaluate_entry, evaluate_exit, EntryEvaluation, ExitEvaluation};
pub use levels::{derive_retracements, find_levels, RetracementLevels, SwingLevels};
pub use summary::{strategy_summary, StrategySummary};
