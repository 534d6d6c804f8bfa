use common::{Bar, Trade};

/// The single-position state machine. Exactly one instance exists per
/// simulation run, owned by the simulator; there is no short side and no
/// partial fill.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Long { entry_price: f64, entry_index: usize },
}

/// Wraps [`PositionState`] with the two legal transitions.
///
/// Buying while long and selling while flat are no-ops rather than errors —
/// the simulator's mutually exclusive per-step branches guarantee neither
/// ever happens.
#[derive(Debug)]
pub struct PositionTracker {
    state: PositionState,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self {
            state: PositionState::Flat,
        }
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn is_flat(&self) -> bool {
        self.state == PositionState::Flat
    }

    /// Flat → Long. Returns false (no-op) when already long.
    pub fn open(&mut self, entry_price: f64, entry_index: usize) -> bool {
        match self.state {
            PositionState::Flat => {
                self.state = PositionState::Long {
                    entry_price,
                    entry_index,
                };
                true
            }
            PositionState::Long { .. } => false,
        }
    }

    /// Long → Flat, emitting exactly one completed [`Trade`] filled at the
    /// exit bar's close. Returns `None` (no-op) when flat or when either
    /// index is out of range.
    pub fn close(&mut self, series: &[Bar], exit_index: usize) -> Option<Trade> {
        let PositionState::Long {
            entry_price,
            entry_index,
        } = self.state
        else {
            return None;
        };

        let entry_bar = series.get(entry_index)?;
        let exit_bar = series.get(exit_index)?;
        let exit_price = exit_bar.close;

        self.state = PositionState::Flat;

        Some(Trade {
            entry_index,
            entry_time: entry_bar.timestamp,
            entry_price,
            exit_index,
            exit_time: exit_bar.timestamp,
            exit_price,
            pnl_percent: (exit_price - entry_price) / entry_price,
        })
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}
