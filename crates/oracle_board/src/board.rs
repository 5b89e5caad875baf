//! The 3×3 board.

use crate::types::{Cell, Player};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::{instrument, trace};

/// 3x3 tic-tac-toe board.
///
/// Cells are addressed by a linear index in row-major order
/// (`index = 3 * row + col`). The only mutation is [`Board::place`],
/// which never overwrites an occupied cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Board {
    /// Cells in row-major order (0-8).
    cells: [Cell; 9],
}

impl Board {
    /// Number of cells on the board.
    pub const SIZE: usize = 9;

    /// Creates a new empty board.
    pub fn new() -> Self {
        Self {
            cells: [Cell::Empty; Self::SIZE],
        }
    }

    /// Creates a board from explicit cell contents.
    ///
    /// No alternation check is made here; turn order belongs to the session.
    pub fn from_cells(cells: [Cell; 9]) -> Self {
        Self { cells }
    }

    /// Places `player`'s mark at `index`.
    ///
    /// Returns `false` without touching the board if the index is outside
    /// 0-8 or the cell is already occupied.
    #[instrument(level = "trace", skip(self))]
    pub fn place(&mut self, index: usize, player: Player) -> bool {
        match self.cells.get_mut(index) {
            Some(cell) if cell.is_empty() => {
                *cell = player.cell();
                true
            }
            Some(_) => {
                trace!(index, "Cell already occupied");
                false
            }
            None => {
                trace!(index, "Index out of range");
                false
            }
        }
    }

    /// Gets the cell at the given index (0-8).
    pub fn get(&self, index: usize) -> Option<Cell> {
        self.cells.get(index).copied()
    }

    /// Checks if the cell at `index` exists and is empty.
    pub fn is_empty(&self, index: usize) -> bool {
        matches!(self.get(index), Some(Cell::Empty))
    }

    /// Returns a copy of all nine cells in index order.
    pub fn snapshot(&self) -> [Cell; 9] {
        self.cells
    }

    /// Returns all cells as a slice.
    pub fn cells(&self) -> &[Cell; 9] {
        &self.cells
    }

    /// Checks if every cell is occupied.
    pub fn is_full(&self) -> bool {
        self.cells.iter().all(|c| !c.is_empty())
    }

    /// Indices of the empty cells, ascending.
    pub fn empty_cells(&self) -> Vec<usize> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, c)| c.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of cells owned by `player`.
    pub fn count(&self, player: Player) -> usize {
        self.cells.iter().filter(|&&c| c == player.cell()).count()
    }

    /// Compact comma-separated form, e.g. `X,_,_,_,O,_,_,_,_`.
    pub fn encode(&self) -> String {
        self.cells
            .iter()
            .map(|c| c.symbol().to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 0..3 {
            let start = row * 3;
            write!(
                f,
                "{}|{}|{}",
                self.cells[start],
                self.cells[start + 1],
                self.cells[start + 2]
            )?;
            if row < 2 {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

/// Error returned when a board string cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum BoardParseError {
    /// The text did not contain exactly nine cells.
    #[display("Expected 9 cells, found {}", found)]
    WrongLength {
        /// Number of cells found.
        found: usize,
    },
    /// A character is not a known cell symbol.
    #[display("Invalid cell symbol {:?} at cell {}", symbol, position)]
    InvalidSymbol {
        /// The offending character.
        symbol: char,
        /// Cell index the character would have occupied.
        position: usize,
    },
}

impl std::error::Error for BoardParseError {}

impl FromStr for Board {
    type Err = BoardParseError;

    /// Parses nine cell symbols, ignoring `,`, `|` and line breaks.
    ///
    /// Accepts `X,X,_,O,O,_,_,_,_`, `XX_OO____`, or the three-row
    /// [`Display`](std::fmt::Display) form.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let symbols: Vec<char> = s
            .chars()
            .filter(|c| !matches!(c, ',' | '|' | '\n' | '\r'))
            .collect();

        if symbols.len() != Self::SIZE {
            return Err(BoardParseError::WrongLength {
                found: symbols.len(),
            });
        }

        let mut cells = [Cell::Empty; 9];
        for (position, symbol) in symbols.into_iter().enumerate() {
            cells[position] = Cell::from_symbol(symbol)
                .ok_or(BoardParseError::InvalidSymbol { symbol, position })?;
        }
        Ok(Self { cells })
    }
}
