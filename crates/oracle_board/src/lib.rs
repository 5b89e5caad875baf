//! Pure tic-tac-toe board logic.
//!
//! This crate holds everything about a 3×3 board that does not depend on
//! who is playing or how verdicts are scored:
//!
//! - **Types**: [`Player`] and [`Cell`] with a stable `X`/`O`/`_` encoding
//! - **Board**: nine cells with validated placement ([`Board::place`])
//! - **Lines**: the eight fixed winning triples ([`WIN_LINES`])
//! - **Progress**: the three-way ground-truth classifier ([`classify`])
//!
//! # Example
//!
//! ```
//! use oracle_board::{Board, Player, ProgressLabel, classify};
//!
//! let mut board = Board::new();
//! assert!(board.place(4, Player::X));
//! assert_eq!(classify(&board).label(), ProgressLabel::Ongoing);
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod board;
mod lines;
mod progress;
mod types;

pub use board::{Board, BoardParseError};
pub use lines::{WIN_LINES, WinLine, winner};
pub use progress::{LabelParseError, Outcome, Progress, ProgressLabel, classify};
pub use types::{Cell, Player};
