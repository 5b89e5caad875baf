//! Winning lines and win detection.

use crate::board::Board;
use crate::types::{Cell, Player};
use tracing::instrument;

/// Three cell indices forming a row, column or diagonal.
pub type WinLine = [usize; 3];

/// The eight winning lines on the 3x3 board.
pub const WIN_LINES: [WinLine; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8], // rows
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8], // columns
    [0, 4, 8],
    [2, 4, 6], // diagonals
];

/// Checks if there is a winner on the board.
///
/// Returns `Some(player)` for the owner of the first fully occupied line
/// in [`WIN_LINES`] order, `None` otherwise.
#[instrument(level = "trace", skip(board))]
pub fn winner(board: &Board) -> Option<Player> {
    let cells = board.cells();
    WIN_LINES.iter().find_map(|&[a, b, c]| match cells[a] {
        Cell::Occupied(player) if cells[b] == cells[a] && cells[c] == cells[a] => Some(player),
        _ => None,
    })
}

/// Checks whether `line` holds two marks of one player and one empty cell.
pub(crate) fn is_open_pair(board: &Board, line: &WinLine) -> bool {
    let cells = line.map(|i| board.cells()[i]);
    let empty = cells.iter().filter(|c| c.is_empty()).count();
    if empty != 1 {
        return false;
    }
    let x = cells.iter().filter(|&&c| c == Player::X.cell()).count();
    let o = cells.iter().filter(|&&c| c == Player::O.cell()).count();
    x == 2 || o == 2
}
