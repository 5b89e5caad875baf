//! Running accuracy bookkeeping for one oracle.

use crate::oracle::Verdict;
use oracle_board::ProgressLabel;
use serde::{Deserialize, Serialize};

/// Correct/total counters plus the most recent verdict.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct OracleTally {
    correct: u64,
    total: u64,
    last: Option<Verdict>,
}

impl OracleTally {
    /// Records one verdict against the ground truth.
    ///
    /// `total` always advances by one, error verdicts included; `correct`
    /// advances only when the labels agree. Returns whether they agreed.
    pub fn record(&mut self, verdict: Verdict, truth: ProgressLabel) -> bool {
        let agreed = verdict.agrees_with(truth);
        self.total += 1;
        if agreed {
            self.correct += 1;
        }
        self.last = Some(verdict);
        agreed
    }

    /// Number of verdicts that matched the ground truth.
    pub fn correct(&self) -> u64 {
        self.correct
    }

    /// Number of verdicts recorded.
    pub fn total(&self) -> u64 {
        self.total
    }

    /// Most recent verdict, if any move has been scored.
    pub fn last(&self) -> Option<Verdict> {
        self.last
    }

    /// Accuracy as a percentage; 0 when nothing has been recorded.
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64 * 100.0
        }
    }
}
