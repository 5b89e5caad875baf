//! Majority-class style baseline.

use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use oracle_board::{Board, ProgressLabel};

/// Answers the same label for every board.
#[derive(Debug, Clone, Copy, derive_new::new)]
pub struct ConstantOracle {
    label: ProgressLabel,
}

impl Oracle for ConstantOracle {
    fn predict(&self, _board: &Board) -> Result<Verdict, OracleError> {
        Ok(Verdict::new(self.label))
    }
}
