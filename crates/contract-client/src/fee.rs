//! Gas budget heuristic for turn actions.
//!
//! Contract gas grows with the length of the move list. The tiers below track
//! contract 0.4.1, which crosses 200k gas around move 25 and 250k around move
//! 80. They are estimates and are expected to be re-tuned per contract version.

use crate::connection::{Fee, StdFee};
use crate::error::ClientError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GasTiers {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    /// Move count at which `medium` applies
    pub medium_from: usize,
    /// Move count at which `high` applies
    pub high_from: usize,
}

impl Default for GasTiers {
    fn default() -> Self {
        Self {
            low: 200_000,
            medium: 250_000,
            high: 300_000,
            medium_from: 20,
            high_from: 60,
        }
    }
}

impl GasTiers {
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.medium_from > self.high_from {
            return Err(ClientError::Config(format!(
                "Gas tier thresholds out of order: medium from {} > high from {}",
                self.medium_from, self.high_from
            )));
        }
        if self.low > self.medium || self.medium > self.high {
            return Err(ClientError::Config("Gas tiers must not decrease".to_string()));
        }
        Ok(())
    }

    pub fn gas_for(&self, move_count: usize) -> u64 {
        if move_count >= self.high_from {
            self.high
        } else if move_count >= self.medium_from {
            self.medium
        } else {
            self.low
        }
    }

    /// Gas-only fee for a game with `move_count` recorded moves.
    pub fn estimate(&self, move_count: usize) -> Fee {
        Fee::Std(StdFee::gas(self.gas_for(move_count)))
    }
}
