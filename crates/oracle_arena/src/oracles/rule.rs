//! Oracle that applies the classification rules directly.

use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use oracle_board::{Board, classify};

/// Always agrees with the ground truth. Useful as an upper bound.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOracle;

impl Oracle for RuleOracle {
    fn predict(&self, board: &Board) -> Result<Verdict, OracleError> {
        Ok(Verdict::with_confidence(classify(board).label(), 1.0))
    }
}
