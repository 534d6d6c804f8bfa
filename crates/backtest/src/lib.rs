pub mod position;
pub mod simulator;
pub mod sweep;

pub use position::{PositionState, PositionTracker};
pub use simulator::BacktestSimulator;
pub use sweep::{run_sweep, SweepConfig, SweepEntry};
