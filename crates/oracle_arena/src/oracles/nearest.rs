//! k-nearest-neighbour lookup over a labeled board dataset.

use crate::error::{ConfigError, OracleError};
use crate::oracle::{Oracle, Verdict};
use oracle_board::{Board, Cell, Player, ProgressLabel};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use strum::IntoEnumIterator;
use tracing::{info, instrument};

/// One dataset row: nine cells named by column letter and row number,
/// plus the target label.
///
/// Cells use the numeric encoding `1` = X, `0` = O, `2` = empty, or any
/// single board symbol (`x`, `o`, `b`, `_`).
#[derive(Debug, Deserialize)]
struct DatasetRow {
    #[serde(rename = "A1")]
    a1: String,
    #[serde(rename = "B1")]
    b1: String,
    #[serde(rename = "C1")]
    c1: String,
    #[serde(rename = "A2")]
    a2: String,
    #[serde(rename = "B2")]
    b2: String,
    #[serde(rename = "C2")]
    c2: String,
    #[serde(rename = "A3")]
    a3: String,
    #[serde(rename = "B3")]
    b3: String,
    #[serde(rename = "C3")]
    c3: String,
    target: String,
}

fn parse_cell(raw: &str) -> Option<Cell> {
    match raw.trim() {
        "1" => Some(Cell::Occupied(Player::X)),
        "0" => Some(Cell::Occupied(Player::O)),
        "2" => Some(Cell::Empty),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Cell::from_symbol(c),
                _ => None,
            }
        }
    }
}

impl DatasetRow {
    fn into_sample(self, row: usize) -> Result<(Board, ProgressLabel), ConfigError> {
        let raw = [
            &self.a1, &self.b1, &self.c1, &self.a2, &self.b2, &self.c2, &self.a3, &self.b3,
            &self.c3,
        ];
        let mut cells = [Cell::Empty; 9];
        for (i, value) in raw.iter().enumerate() {
            cells[i] = parse_cell(value).ok_or_else(|| {
                ConfigError::new(format!("Row {}: invalid cell value {:?}", row, value))
            })?;
        }
        let label = self
            .target
            .parse::<ProgressLabel>()
            .map_err(|e| ConfigError::new(format!("Row {}: {}", row, e)))?;
        Ok((Board::from_cells(cells), label))
    }
}

/// Distance-weighted k-nearest-neighbour classifier over stored boards.
///
/// Distance is the number of differing cells. Neighbours at distance zero,
/// if any, outvote everything else; otherwise each neighbour weighs
/// `1 / distance`. Confidence is the winning label's share of the weight.
#[derive(Debug, Clone)]
pub struct NearestNeighborOracle {
    samples: Vec<(Board, ProgressLabel)>,
    k: usize,
}

impl NearestNeighborOracle {
    /// Default neighbour count.
    pub const DEFAULT_K: usize = 5;

    /// Creates an oracle from labeled boards.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `samples` is empty or `k` is zero.
    pub fn new(samples: Vec<(Board, ProgressLabel)>, k: usize) -> Result<Self, ConfigError> {
        if samples.is_empty() {
            return Err(ConfigError::new("Nearest-neighbour dataset is empty"));
        }
        if k == 0 {
            return Err(ConfigError::new("Nearest-neighbour k must be at least 1"));
        }
        Ok(Self { samples, k })
    }

    /// Loads a CSV dataset with header `A1,B1,C1,A2,B2,C2,A3,B3,C3,target`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read or a row is malformed.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_csv(path: impl AsRef<Path>, k: usize) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path.as_ref()).map_err(|e| {
            ConfigError::new(format!(
                "Failed to open dataset {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        let oracle = Self::from_reader(file, k)?;
        info!(samples = oracle.samples.len(), k, "Loaded nearest-neighbour dataset");
        Ok(oracle)
    }

    /// Loads a CSV dataset from any reader.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a row is malformed or the dataset is empty.
    pub fn from_reader(reader: impl Read, k: usize) -> Result<Self, ConfigError> {
        let mut csv = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut samples = Vec::new();
        for (i, record) in csv.deserialize::<DatasetRow>().enumerate() {
            let row = i + 1;
            let record =
                record.map_err(|e| ConfigError::new(format!("Row {}: {}", row, e)))?;
            samples.push(record.into_sample(row)?);
        }
        Self::new(samples, k)
    }

    /// Number of stored samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; construction rejects empty datasets.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

fn distance(a: &Board, b: &Board) -> usize {
    a.cells()
        .iter()
        .zip(b.cells())
        .filter(|(x, y)| x != y)
        .count()
}

fn label_slot(label: ProgressLabel) -> usize {
    match label {
        ProgressLabel::Ongoing => 0,
        ProgressLabel::NearEnd => 1,
        ProgressLabel::Terminal => 2,
    }
}

impl Oracle for NearestNeighborOracle {
    fn predict(&self, board: &Board) -> Result<Verdict, OracleError> {
        let mut ranked: Vec<(usize, ProgressLabel)> = self
            .samples
            .iter()
            .map(|(sample, label)| (distance(board, sample), *label))
            .collect();
        ranked.sort_by_key(|(d, _)| *d);
        ranked.truncate(self.k);

        let exact = ranked.iter().any(|(d, _)| *d == 0);
        let mut weights = [0.0f64; 3];
        for (d, label) in &ranked {
            let weight = match (exact, *d) {
                (true, 0) => 1.0,
                (true, _) => 0.0,
                (false, d) => 1.0 / d as f64,
            };
            weights[label_slot(*label)] += weight;
        }

        let total: f64 = weights.iter().sum();
        let (best, weight) = ProgressLabel::iter()
            .map(|label| (label, weights[label_slot(label)]))
            .fold(None, |best: Option<(ProgressLabel, f64)>, candidate| match best {
                Some(b) if b.1 >= candidate.1 => Some(b),
                _ => Some(candidate),
            })
            .ok_or_else(|| OracleError::new("No neighbours to vote"))?;

        if total <= 0.0 {
            return Err(OracleError::new("Neighbour weights sum to zero"));
        }
        Ok(Verdict::with_confidence(best, weight / total))
    }
}
