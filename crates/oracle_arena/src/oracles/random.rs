//! Chance-level baseline.

use crate::error::OracleError;
use crate::oracle::{Oracle, Verdict};
use oracle_board::{Board, ProgressLabel};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;
use std::sync::{Mutex, PoisonError};
use strum::IntoEnumIterator;

/// Guesses a label uniformly at random.
#[derive(Debug)]
pub struct RandomOracle {
    rng: Mutex<ChaCha8Rng>,
}

impl RandomOracle {
    /// Creates a guesser; `None` seeds from entropy.
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Oracle for RandomOracle {
    fn predict(&self, _board: &Board) -> Result<Verdict, OracleError> {
        let labels: Vec<ProgressLabel> = ProgressLabel::iter().collect();
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        let label = labels
            .choose(&mut *rng)
            .copied()
            .ok_or_else(|| OracleError::new("No labels to choose from"))?;
        Ok(Verdict::with_confidence(label, 1.0 / labels.len() as f64))
    }
}
