//! Plain-text console front end.
//!
//! The human enters cells 1-9, the automated side answers at random, and
//! after every move the ground truth is printed next to each oracle's
//! verdict and running accuracy.

use crate::session::Session;
use crate::snapshot::Snapshot;
use oracle_board::{Cell, Outcome};
use std::io::{self, BufRead, Write};
use tracing::{debug, instrument};

/// Renders the board with free cells numbered 1-9.
pub fn render_board(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    for row in 0..3 {
        let cells: Vec<String> = (0..3)
            .map(|col| {
                let index = row * 3 + col;
                match snapshot.board[index] {
                    Cell::Empty => (index + 1).to_string(),
                    occupied => occupied.to_string(),
                }
            })
            .collect();
        out.push_str(&format!(" {} | {} | {}\n", cells[0], cells[1], cells[2]));
        if row < 2 {
            out.push_str("---+---+---\n");
        }
    }
    out
}

/// Renders the ground truth and the oracle scoreboard.
pub fn render_analysis(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    match snapshot.ground_truth {
        Some(truth) => out.push_str(&format!("Ground truth: {}\n", truth)),
        None => out.push_str("Ground truth: (no moves yet)\n"),
    }

    let primary = snapshot.primary.as_ref().map(|p| p.name.as_str());
    for report in &snapshot.oracles {
        let marker = if Some(report.name.as_str()) == primary {
            "*"
        } else {
            " "
        };
        let verdict = match &report.last_verdict {
            Some(v) => match v.confidence {
                Some(c) => format!("{} ({:.0}%)", v.label, c * 100.0),
                None => v.label.to_string(),
            },
            None => "-".to_string(),
        };
        let mark = match (&report.last_verdict, snapshot.ground_truth) {
            (Some(v), Some(truth)) if v.agrees_with(truth) => "correct",
            (Some(_), Some(_)) => "wrong",
            _ => "",
        };
        out.push_str(&format!(
            "{} {:<16} {:<20} {:<8} {}/{} ({:.1}%)\n",
            marker, report.name, verdict, mark, report.correct, report.total, report.accuracy
        ));
    }
    out
}

fn render_result(snapshot: &Snapshot) -> String {
    match snapshot.winner {
        Some(Outcome::Winner(player)) => format!("Player {} wins!", player),
        Some(Outcome::Draw) => "Game ended in a draw!".to_string(),
        None => String::new(),
    }
}

fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    text: &str,
) -> io::Result<Option<String>> {
    write!(output, "{}", text)?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

/// Runs games on `session` until the player declines a rematch or input
/// ends.
///
/// # Errors
///
/// Returns I/O errors from `input` or `output`. Rejected moves are
/// reported to the player and never end the loop.
#[instrument(skip_all, fields(session_id = %session.id()))]
pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    mut input: R,
    mut output: W,
) -> io::Result<()> {
    writeln!(output, "Tic-tac-toe with progress oracles")?;
    writeln!(
        output,
        "You play {}, the computer plays {} at random. Enter 1-9 to move.",
        session.automated_player().opponent(),
        session.automated_player()
    )?;

    loop {
        let snapshot = session.snapshot();
        writeln!(output)?;
        write!(output, "{}", render_board(&snapshot))?;
        write!(output, "{}", render_analysis(&snapshot))?;

        if snapshot.game_over {
            writeln!(output, "{}", render_result(&snapshot))?;
            let answer = prompt(&mut input, &mut output, "Play again? (y/n): ")?;
            match answer.map(|a| a.to_lowercase()).as_deref() {
                Some("y" | "yes" | "s" | "sim") => {
                    session.reset();
                    continue;
                }
                _ => {
                    writeln!(output, "Thanks for playing!")?;
                    return Ok(());
                }
            }
        }

        if snapshot.is_automated_turn() {
            match session.submit_automated_move() {
                Ok(_) => writeln!(output, "Computer played {}.", snapshot.automated_player)?,
                Err(e) => {
                    writeln!(output, "Computer could not move: {}", e.kind())?;
                    return Ok(());
                }
            }
            continue;
        }

        let text = format!("Player {}, choose a cell (1-9): ", snapshot.current_turn);
        let Some(answer) = prompt(&mut input, &mut output, &text)? else {
            debug!("Input closed");
            return Ok(());
        };

        let index = match answer.parse::<usize>() {
            Ok(n) if (1..=9).contains(&n) => n - 1,
            _ => {
                writeln!(output, "Invalid position! Enter a number from 1 to 9.")?;
                continue;
            }
        };

        if let Err(e) = session.submit_human_move(index) {
            writeln!(output, "{}", e.kind())?;
        }
    }
}
