//! Read-only view of a session, returned after every operation.

use crate::oracle::Verdict;
use oracle_board::{Cell, Outcome, Player, ProgressLabel};
use serde::{Deserialize, Serialize};

/// One oracle's standing within a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_new::new)]
pub struct OracleReport {
    /// Registered oracle name.
    pub name: String,
    /// Verdict on the most recent move, if any.
    pub last_verdict: Option<Verdict>,
    /// Running accuracy as a percentage.
    pub accuracy: f64,
    /// Verdicts that matched the ground truth.
    pub correct: u64,
    /// Verdicts recorded.
    pub total: u64,
}

/// Everything a front end needs to render a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Session the snapshot was taken from.
    pub session_id: String,
    /// Cells in index order, encoded `X`, `O`, `_`.
    pub board: [Cell; 9],
    /// Side to move next (or the side that made the final move).
    pub current_turn: Player,
    /// Side moved by the random opponent.
    pub automated_player: Player,
    /// Whether the game has ended.
    pub game_over: bool,
    /// Winner or draw once the game is over.
    pub winner: Option<Outcome>,
    /// Moves applied since the last reset.
    pub move_count: u32,
    /// Ground-truth label of the current board, once a move has been made.
    pub ground_truth: Option<ProgressLabel>,
    /// Report for the primary oracle, if one is designated.
    pub primary: Option<OracleReport>,
    /// Reports for every oracle, in registration order.
    pub oracles: Vec<OracleReport>,
}

impl Snapshot {
    /// Checks if the next move belongs to the automated side.
    pub fn is_automated_turn(&self) -> bool {
        !self.game_over && self.current_turn == self.automated_player
    }
}
