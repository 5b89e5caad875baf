//! Three-way progress classification.
//!
//! [`classify`] is the ground truth every oracle is scored against. Its
//! vocabulary is deliberately coarse: a board that is one move from a win
//! for *either* side is [`Progress::NearEnd`], with no record of which side.

use crate::board::Board;
use crate::lines::{WIN_LINES, is_open_pair, winner};
use crate::types::Player;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Outcome {
    /// Game ended in a win.
    Winner(Player),
    /// Full board with no completed line.
    Draw,
}

impl From<Outcome> for String {
    fn from(outcome: Outcome) -> Self {
        outcome.to_string()
    }
}

impl TryFrom<String> for Outcome {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        match s.as_str() {
            "X" | "x" => Ok(Outcome::Winner(Player::X)),
            "O" | "o" => Ok(Outcome::Winner(Player::O)),
            "draw" | "Draw" => Ok(Outcome::Draw),
            other => Err(format!("Unknown outcome {:?}", other)),
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Outcome::Winner(player) => write!(f, "{}", player),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// Coarse progress label shared by the classifier and every oracle.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case", try_from = "String")]
pub enum ProgressLabel {
    /// No side can finish on the next move.
    #[display("ongoing")]
    Ongoing,
    /// Some side has two in a line with the third cell empty.
    #[display("near_end")]
    NearEnd,
    /// A line is complete or the board is full.
    #[display("terminal")]
    Terminal,
}

/// Error returned for an unrecognised progress label.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
#[display("Unknown progress label {:?}", _0)]
pub struct LabelParseError(pub String);

impl std::error::Error for LabelParseError {}

impl FromStr for ProgressLabel {
    type Err = LabelParseError;

    /// Parses canonical labels and the legacy dataset spellings,
    /// case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "ongoing" | "tem_jogo" => Ok(ProgressLabel::Ongoing),
            "near_end" | "possibilidade_de_fim" => Ok(ProgressLabel::NearEnd),
            "terminal" | "fim_de_jogo" => Ok(ProgressLabel::Terminal),
            _ => Err(LabelParseError(s.to_string())),
        }
    }
}

impl TryFrom<String> for ProgressLabel {
    type Error = LabelParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Ground-truth classification of a board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Progress {
    /// Game continues; no immediate win is available.
    Ongoing,
    /// An immediate win is reachable next move.
    NearEnd,
    /// Game is over.
    Terminal(Outcome),
}

impl Progress {
    /// Returns the bare label, dropping the outcome.
    pub fn label(&self) -> ProgressLabel {
        match self {
            Progress::Ongoing => ProgressLabel::Ongoing,
            Progress::NearEnd => ProgressLabel::NearEnd,
            Progress::Terminal(_) => ProgressLabel::Terminal,
        }
    }

    /// Returns the outcome for terminal boards.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Progress::Terminal(outcome) => Some(*outcome),
            _ => None,
        }
    }

    /// Checks if the game is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Progress::Terminal(_))
    }
}

impl std::fmt::Display for Progress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Progress::Terminal(outcome) => write!(f, "terminal ({})", outcome),
            other => write!(f, "{}", other.label()),
        }
    }
}

/// Classifies a board.
///
/// 1. A completed line wins, even on a full board.
/// 2. A full board without a line is a draw.
/// 3. Two marks of one player plus an empty cell on any line is near-end.
/// 4. Anything else is ongoing.
#[instrument(level = "trace", skip(board), fields(board = %board.encode()))]
pub fn classify(board: &Board) -> Progress {
    if let Some(player) = winner(board) {
        return Progress::Terminal(Outcome::Winner(player));
    }

    if board.is_full() {
        return Progress::Terminal(Outcome::Draw);
    }

    if WIN_LINES.iter().any(|line| is_open_pair(board, line)) {
        return Progress::NearEnd;
    }

    Progress::Ongoing
}
