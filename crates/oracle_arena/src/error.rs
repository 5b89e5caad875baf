//! Error types for the arena.

use derive_more::{Display, Error};
use tracing::instrument;

/// What went wrong in an engine operation.
///
/// None of these are fatal; callers are expected to report them and retry.
#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub enum ArenaErrorKind {
    /// Occupied cell, out-of-range index, wrong turn, or game already over.
    #[display("Invalid move: {}", _0)]
    InvalidMove(String),

    /// Automated move requested out of turn or after the game ended.
    #[display("Automated move not allowed: {}", _0)]
    IllegalAutomatedTurn(String),

    /// No session is stored under the given id.
    #[display("Session not found: {}", _0)]
    SessionNotFound(String),

    /// A session with the given id already exists.
    #[display("Session already exists: {}", _0)]
    SessionExists(String),

    /// The default session cannot be created or dropped by id.
    #[display("Session id is reserved: {}", _0)]
    ReservedSession(String),
}

impl std::error::Error for ArenaErrorKind {}

/// Arena error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("{} at {}:{}", kind, file, line)]
pub struct ArenaError {
    /// Error kind.
    pub kind: ArenaErrorKind,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ArenaError {
    /// Creates a new error with caller location tracking.
    #[track_caller]
    #[instrument(skip(kind))]
    pub fn new(kind: ArenaErrorKind) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Shorthand for [`ArenaErrorKind::InvalidMove`].
    #[track_caller]
    pub fn invalid_move(reason: impl Into<String>) -> Self {
        Self::new(ArenaErrorKind::InvalidMove(reason.into()))
    }

    /// Shorthand for [`ArenaErrorKind::IllegalAutomatedTurn`].
    #[track_caller]
    pub fn illegal_automated_turn(reason: impl Into<String>) -> Self {
        Self::new(ArenaErrorKind::IllegalAutomatedTurn(reason.into()))
    }

    /// Shorthand for [`ArenaErrorKind::SessionNotFound`].
    #[track_caller]
    pub fn session_not_found(id: impl Into<String>) -> Self {
        Self::new(ArenaErrorKind::SessionNotFound(id.into()))
    }

    /// Shorthand for [`ArenaErrorKind::SessionExists`].
    #[track_caller]
    pub fn session_exists(id: impl Into<String>) -> Self {
        Self::new(ArenaErrorKind::SessionExists(id.into()))
    }

    /// Shorthand for [`ArenaErrorKind::ReservedSession`].
    #[track_caller]
    pub fn reserved_session(id: impl Into<String>) -> Self {
        Self::new(ArenaErrorKind::ReservedSession(id.into()))
    }

    /// Returns the error kind.
    pub fn kind(&self) -> &ArenaErrorKind {
        &self.kind
    }
}

/// Oracle failure, recorded as an `ERROR` verdict rather than propagated.
#[derive(Debug, Clone, Display, Error)]
#[display("Oracle error: {} at {}:{}", message, file, line)]
pub struct OracleError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl OracleError {
    /// Creates a new oracle error with caller location tracking.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// Configuration or collaborator setup error.
#[derive(Debug, Clone, Display, Error)]
#[display("Config error: {} at {}:{}", message, file, line)]
pub struct ConfigError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl ConfigError {
    /// Creates a new configuration error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}
