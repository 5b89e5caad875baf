//! Core domain types for tic-tac-toe.

use serde::{Deserialize, Serialize};

/// Player in the game.
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
)]
pub enum Player {
    /// Player X (goes first).
    #[display("X")]
    X,
    /// Player O (goes second).
    #[display("O")]
    O,
}

impl Player {
    /// Returns the opponent player.
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    /// Returns the cell this player's mark occupies.
    pub fn cell(self) -> Cell {
        Cell::Occupied(self)
    }
}

/// A cell on the board.
///
/// Serializes as a single symbol: `X`, `O`, or `_` for empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "char", try_from = "char")]
pub enum Cell {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell occupied by a player.
    Occupied(Player),
}

impl Cell {
    /// Returns the display symbol for this cell.
    pub fn symbol(self) -> char {
        match self {
            Cell::Empty => '_',
            Cell::Occupied(Player::X) => 'X',
            Cell::Occupied(Player::O) => 'O',
        }
    }

    /// Parses a cell symbol.
    ///
    /// Accepts either case for marks and several common spellings of an
    /// empty cell (`_`, `.`, `-`, space, `b` for "blank").
    pub fn from_symbol(symbol: char) -> Option<Self> {
        match symbol {
            'X' | 'x' => Some(Cell::Occupied(Player::X)),
            'O' | 'o' => Some(Cell::Occupied(Player::O)),
            '_' | '.' | '-' | ' ' | 'b' => Some(Cell::Empty),
            _ => None,
        }
    }

    /// Returns the owning player, if any.
    pub fn player(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::Occupied(player) => Some(player),
        }
    }

    /// Returns true if the cell is empty.
    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }
}

impl From<Cell> for char {
    fn from(cell: Cell) -> Self {
        cell.symbol()
    }
}

impl TryFrom<char> for Cell {
    type Error = String;

    fn try_from(symbol: char) -> Result<Self, Self::Error> {
        Cell::from_symbol(symbol).ok_or_else(|| format!("Invalid cell symbol {:?}", symbol))
    }
}

impl std::fmt::Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}
