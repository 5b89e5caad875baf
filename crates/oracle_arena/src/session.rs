//! One game of tic-tac-toe plus its oracle scoreboard.

use crate::error::ArenaError;
use crate::oracle::OracleRegistry;
use crate::snapshot::{OracleReport, Snapshot};
use crate::tally::OracleTally;
use oracle_board::{Board, Outcome, Player, Progress, classify};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Unique identifier for a game session.
pub type SessionId = String;

/// Session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    /// Moves are accepted.
    InProgress,
    /// The board is terminal; only reset is possible.
    GameOver(Outcome),
}

/// Per-session settings fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, derive_new::new)]
pub struct SessionSettings {
    /// Side whose moves are chosen uniformly at random.
    #[serde(default = "default_automated_player")]
    pub automated_player: Player,
    /// Seed for the automated player's RNG. `None` seeds from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
}

fn default_automated_player() -> Player {
    Player::O
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::new(default_automated_player(), None)
    }
}

/// A single game with a human side, an automated side, and accuracy
/// tallies for every registered oracle.
///
/// All mutation goes through `&mut self`; callers sharing a session must
/// hold it behind a lock (see [`SessionStore`](crate::SessionStore)).
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    oracles: Arc<OracleRegistry>,
    automated: Player,
    rng: ChaCha8Rng,
    board: Board,
    turn: Player,
    status: SessionStatus,
    moves: u32,
    ground_truth: Option<Progress>,
    tallies: Vec<OracleTally>,
}

impl Session {
    /// Creates a new session in its initial state.
    #[instrument(skip(oracles), fields(oracles = oracles.len()))]
    pub fn new(id: SessionId, oracles: Arc<OracleRegistry>, settings: SessionSettings) -> Self {
        info!(
            session_id = %id,
            automated = %settings.automated_player,
            "Creating new game session"
        );
        let rng = match settings.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        let tallies = vec![OracleTally::default(); oracles.len()];
        Self {
            id,
            oracles,
            automated: settings.automated_player,
            rng,
            board: Board::new(),
            turn: Player::X,
            status: SessionStatus::InProgress,
            moves: 0,
            ground_truth: None,
            tallies,
        }
    }

    /// Session id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current board.
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Side to move.
    pub fn turn(&self) -> Player {
        self.turn
    }

    /// Side moved by the random opponent.
    pub fn automated_player(&self) -> Player {
        self.automated
    }

    /// Lifecycle state.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Checks if the game has ended.
    pub fn is_game_over(&self) -> bool {
        matches!(self.status, SessionStatus::GameOver(_))
    }

    /// Moves applied since the last reset.
    pub fn move_count(&self) -> u32 {
        self.moves
    }

    /// Ground truth for the current board, once a move has been made.
    pub fn ground_truth(&self) -> Option<Progress> {
        self.ground_truth
    }

    /// Tallies in oracle registration order.
    pub fn tallies(&self) -> &[OracleTally] {
        &self.tallies
    }

    /// Places the current side's mark at `index` and scores every oracle.
    ///
    /// # Errors
    ///
    /// Returns an invalid-move error, leaving the session untouched, if the
    /// game is over, the index is outside 0-8, or the cell is occupied.
    #[instrument(skip(self), fields(session_id = %self.id, player = %self.turn))]
    pub fn submit_move(&mut self, index: usize) -> Result<Snapshot, ArenaError> {
        if let SessionStatus::GameOver(outcome) = self.status {
            warn!(index, %outcome, "Move submitted after game over");
            return Err(ArenaError::invalid_move("Game is already over"));
        }

        if index >= Board::SIZE {
            warn!(index, "Position out of bounds");
            return Err(ArenaError::invalid_move(format!(
                "Position {} out of bounds (must be 0-8)",
                index
            )));
        }

        let player = self.turn;
        if !self.board.place(index, player) {
            warn!(index, "Cell already occupied");
            return Err(ArenaError::invalid_move(format!(
                "Cell {} is already occupied",
                index
            )));
        }
        self.moves += 1;

        let truth = classify(&self.board);
        let verdicts = self.oracles.evaluate(&self.board);
        for ((tally, verdict), name) in self
            .tallies
            .iter_mut()
            .zip(verdicts)
            .zip(self.oracles.names())
        {
            let agreed = tally.record(verdict, truth.label());
            debug!(oracle = name, label = %verdict.label, agreed, "Scored oracle");
        }
        self.ground_truth = Some(truth);

        match truth.outcome() {
            Some(outcome) => {
                self.status = SessionStatus::GameOver(outcome);
                info!(index, %outcome, moves = self.moves, "Game over");
            }
            None => {
                self.turn = player.opponent();
                info!(index, progress = %truth, next = %self.turn, "Move applied");
            }
        }

        Ok(self.snapshot())
    }

    /// Like [`Session::submit_move`], but refuses to move for the automated
    /// side. Front ends use this for human input.
    ///
    /// # Errors
    ///
    /// Returns an invalid-move error on the automated side's turn, plus
    /// everything [`Session::submit_move`] rejects.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_human_move(&mut self, index: usize) -> Result<Snapshot, ArenaError> {
        if !self.is_game_over() && self.turn == self.automated {
            warn!(index, turn = %self.turn, "Human tried to move on the automated turn");
            return Err(ArenaError::invalid_move(format!(
                "Not your turn. Waiting for player {}",
                self.turn
            )));
        }
        self.submit_move(index)
    }

    /// Plays the automated side: a uniformly random empty cell.
    ///
    /// # Errors
    ///
    /// Returns an illegal-automated-turn error if the game is over, it is
    /// the human side's turn, or no empty cell remains.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn submit_automated_move(&mut self) -> Result<Snapshot, ArenaError> {
        if self.is_game_over() {
            warn!("Automated move requested after game over");
            return Err(ArenaError::illegal_automated_turn("Game is already over"));
        }

        if self.turn != self.automated {
            warn!(turn = %self.turn, automated = %self.automated, "Automated move out of turn");
            return Err(ArenaError::illegal_automated_turn(format!(
                "It is {}'s turn; the automated player is {}",
                self.turn, self.automated
            )));
        }

        let empty = self.board.empty_cells();
        let index = *empty.choose(&mut self.rng).ok_or_else(|| {
            warn!("No empty cells for automated move");
            ArenaError::illegal_automated_turn("No empty cells remain")
        })?;

        debug!(index, candidates = empty.len(), "Automated player chose cell");
        self.submit_move(index)
    }

    /// Returns the session to its creation-time state.
    ///
    /// The RNG keeps its stream, so successive games differ even with a
    /// fixed seed.
    #[instrument(skip(self), fields(session_id = %self.id))]
    pub fn reset(&mut self) -> Snapshot {
        info!(moves = self.moves, "Resetting session");
        self.board = Board::new();
        self.turn = Player::X;
        self.status = SessionStatus::InProgress;
        self.moves = 0;
        self.ground_truth = None;
        self.tallies = vec![OracleTally::default(); self.oracles.len()];
        self.snapshot()
    }

    /// Builds a snapshot of the current state.
    pub fn snapshot(&self) -> Snapshot {
        let oracles: Vec<OracleReport> = self
            .oracles
            .names()
            .zip(&self.tallies)
            .map(|(name, tally)| {
                OracleReport::new(
                    name.to_string(),
                    tally.last(),
                    tally.accuracy(),
                    tally.correct(),
                    tally.total(),
                )
            })
            .collect();

        let primary = self
            .oracles
            .primary_index()
            .and_then(|i| oracles.get(i).cloned());

        Snapshot {
            session_id: self.id.clone(),
            board: self.board.snapshot(),
            current_turn: self.turn,
            automated_player: self.automated,
            game_over: self.is_game_over(),
            winner: match self.status {
                SessionStatus::GameOver(outcome) => Some(outcome),
                SessionStatus::InProgress => None,
            },
            move_count: self.moves,
            ground_truth: self.ground_truth.map(|p| p.label()),
            primary,
            oracles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArenaErrorKind, OracleError};
    use crate::oracle::Verdict;
    use oracle_board::{Cell, ProgressLabel};

    fn registry() -> Arc<OracleRegistry> {
        Arc::new(
            OracleRegistry::builder()
                .register("truth", |b: &Board| -> Result<Verdict, OracleError> {
                    Ok(Verdict::new(classify(b).label()))
                })
                .build()
                .unwrap(),
        )
    }

    fn session() -> Session {
        Session::new("test".to_string(), registry(), SessionSettings::new(Player::O, Some(7)))
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert_eq!(s.turn(), Player::X);
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert_eq!(s.move_count(), 0);
        assert_eq!(s.tallies()[0].total(), 0);
    }

    #[test]
    fn test_center_move() {
        let mut s = session();
        let snap = s.submit_move(4).unwrap();
        assert_eq!(snap.board[4], Cell::Occupied(Player::X));
        assert_eq!(snap.ground_truth, Some(ProgressLabel::Ongoing));
        assert_eq!(snap.current_turn, Player::O);
        assert_eq!(snap.move_count, 1);
    }

    #[test]
    fn test_rejects_after_game_over() {
        let mut s = session();
        for index in [0, 3, 1, 4, 2] {
            s.submit_move(index).unwrap();
        }
        assert_eq!(s.status(), SessionStatus::GameOver(Outcome::Winner(Player::X)));
        let err = s.submit_move(8).unwrap_err();
        assert!(matches!(err.kind(), ArenaErrorKind::InvalidMove(_)));
        assert_eq!(s.move_count(), 5);
    }

    #[test]
    fn test_automated_move_only_on_its_turn() {
        let mut s = session();
        let err = s.submit_automated_move().unwrap_err();
        assert!(matches!(err.kind(), ArenaErrorKind::IllegalAutomatedTurn(_)));

        s.submit_human_move(0).unwrap();
        let snap = s.submit_automated_move().unwrap();
        assert_eq!(snap.move_count, 2);
        assert_eq!(snap.current_turn, Player::X);
    }

    #[test]
    fn test_human_move_refused_on_automated_turn() {
        let mut s = session();
        s.submit_human_move(4).unwrap();
        let err = s.submit_human_move(0).unwrap_err();
        assert!(matches!(err.kind(), ArenaErrorKind::InvalidMove(_)));
        assert!(s.board().is_empty(0));
    }
}
