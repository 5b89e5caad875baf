//! Oracle port and registry.
//!
//! An oracle is anything that looks at a board and guesses its
//! [`ProgressLabel`]. The engine never inspects what kind of oracle it is
//! talking to: every registered oracle is consulted the same way, in
//! registration order, and a failing oracle degrades to [`Verdict::error`]
//! instead of aborting the move.

use crate::error::{ConfigError, OracleError};
use oracle_board::{Board, ProgressLabel};
use serde::{Deserialize, Serialize};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument, warn};

/// Label carried by a verdict: a progress class, or `error`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum VerdictLabel {
    /// The oracle predicted a progress class.
    Progress(ProgressLabel),
    /// The oracle call failed.
    Error,
}

impl From<VerdictLabel> for String {
    fn from(label: VerdictLabel) -> Self {
        label.to_string()
    }
}

impl TryFrom<String> for VerdictLabel {
    type Error = String;

    fn try_from(s: String) -> Result<Self, String> {
        if s.eq_ignore_ascii_case("error") {
            return Ok(VerdictLabel::Error);
        }
        s.parse::<ProgressLabel>()
            .map(VerdictLabel::Progress)
            .map_err(|e| e.to_string())
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictLabel::Progress(label) => write!(f, "{}", label),
            VerdictLabel::Error => write!(f, "error"),
        }
    }
}

/// An oracle's answer for one board.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Predicted label.
    pub label: VerdictLabel,
    /// Optional confidence in `[0, 1]`. Informational only.
    pub confidence: Option<f64>,
}

impl Verdict {
    /// A verdict without confidence.
    pub fn new(label: ProgressLabel) -> Self {
        Self {
            label: VerdictLabel::Progress(label),
            confidence: None,
        }
    }

    /// A verdict with confidence, clamped to `[0, 1]`. A NaN or infinite
    /// confidence is dropped.
    pub fn with_confidence(label: ProgressLabel, confidence: f64) -> Self {
        Self {
            label: VerdictLabel::Progress(label),
            confidence: confidence.is_finite().then(|| confidence.clamp(0.0, 1.0)),
        }
    }

    /// The distinguished failure verdict, confidence 0.
    pub fn error() -> Self {
        Self {
            label: VerdictLabel::Error,
            confidence: Some(0.0),
        }
    }

    /// Checks if this verdict records a failure.
    pub fn is_error(&self) -> bool {
        self.label == VerdictLabel::Error
    }

    /// Checks if the predicted label equals `truth`. Errors never match.
    pub fn agrees_with(&self, truth: ProgressLabel) -> bool {
        self.label == VerdictLabel::Progress(truth)
    }
}

/// Capability to predict a board's progress label.
///
/// Implementations may hold pretrained parameters but must not touch game
/// state; the engine only ever lends them a shared board reference.
pub trait Oracle: Send + Sync {
    /// Predicts the progress label for `board`.
    fn predict(&self, board: &Board) -> Result<Verdict, OracleError>;
}

impl<F> Oracle for F
where
    F: Fn(&Board) -> Result<Verdict, OracleError> + Send + Sync,
{
    fn predict(&self, board: &Board) -> Result<Verdict, OracleError> {
        self(board)
    }
}

struct RegisteredOracle {
    name: String,
    oracle: Box<dyn Oracle>,
}

/// Static, ordered set of named oracles.
///
/// Built once at startup with [`OracleRegistry::builder`] and shared
/// read-only by every session.
pub struct OracleRegistry {
    entries: Vec<RegisteredOracle>,
    primary: Option<usize>,
}

impl std::fmt::Debug for OracleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleRegistry")
            .field("names", &self.names().collect::<Vec<_>>())
            .field("primary", &self.primary())
            .finish()
    }
}

impl OracleRegistry {
    /// Starts building a registry.
    pub fn builder() -> OracleRegistryBuilder {
        OracleRegistryBuilder::default()
    }

    /// Oracle names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    /// Number of registered oracles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Checks if no oracles are registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Name of the primary oracle, if one is designated.
    pub fn primary(&self) -> Option<&str> {
        self.primary.map(|i| self.entries[i].name.as_str())
    }

    /// Position of the primary oracle in registration order.
    pub fn primary_index(&self) -> Option<usize> {
        self.primary
    }

    /// Consults every oracle on `board`, in registration order.
    ///
    /// Returned verdicts line up with [`OracleRegistry::names`]. An oracle
    /// that returns an error or panics yields [`Verdict::error`].
    #[instrument(skip(self, board), fields(board = %board.encode(), oracles = self.entries.len()))]
    pub fn evaluate(&self, board: &Board) -> Vec<Verdict> {
        self.entries
            .iter()
            .map(|entry| consult(&entry.name, entry.oracle.as_ref(), board))
            .collect()
    }
}

fn consult(name: &str, oracle: &dyn Oracle, board: &Board) -> Verdict {
    match panic::catch_unwind(AssertUnwindSafe(|| oracle.predict(board))) {
        Ok(Ok(verdict)) => {
            debug!(
                oracle = name,
                label = %verdict.label,
                confidence = ?verdict.confidence,
                "Oracle verdict"
            );
            verdict
        }
        Ok(Err(e)) => {
            warn!(oracle = name, error = %e, "Oracle failed, recording error verdict");
            Verdict::error()
        }
        Err(payload) => {
            let message = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            warn!(oracle = name, panic = %message, "Oracle panicked, recording error verdict");
            Verdict::error()
        }
    }
}

/// Builder for [`OracleRegistry`].
#[derive(Default)]
pub struct OracleRegistryBuilder {
    entries: Vec<RegisteredOracle>,
    primary: Option<String>,
}

impl OracleRegistryBuilder {
    /// Registers an oracle under `name`.
    pub fn register(mut self, name: impl Into<String>, oracle: impl Oracle + 'static) -> Self {
        self.entries.push(RegisteredOracle {
            name: name.into(),
            oracle: Box::new(oracle),
        });
        self
    }

    /// Registers an already boxed oracle under `name`.
    pub fn register_boxed(mut self, name: impl Into<String>, oracle: Box<dyn Oracle>) -> Self {
        self.entries.push(RegisteredOracle {
            name: name.into(),
            oracle,
        });
        self
    }

    /// Designates the primary oracle by name.
    pub fn primary(mut self, name: impl Into<String>) -> Self {
        self.primary = Some(name.into());
        self
    }

    /// Finishes the registry.
    ///
    /// Without an explicit primary, the first registered oracle is primary.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for duplicate names or an unknown primary.
    #[instrument(skip(self), fields(count = self.entries.len()))]
    pub fn build(self) -> Result<OracleRegistry, ConfigError> {
        for (i, entry) in self.entries.iter().enumerate() {
            if self.entries[..i].iter().any(|e| e.name == entry.name) {
                return Err(ConfigError::new(format!(
                    "Duplicate oracle name: {}",
                    entry.name
                )));
            }
        }

        let primary = match &self.primary {
            Some(name) => Some(
                self.entries
                    .iter()
                    .position(|e| &e.name == name)
                    .ok_or_else(|| ConfigError::new(format!("Unknown primary oracle: {}", name)))?,
            ),
            None if self.entries.is_empty() => None,
            None => Some(0),
        };

        Ok(OracleRegistry {
            entries: self.entries,
            primary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(label: ProgressLabel) -> impl Oracle {
        move |_: &Board| -> Result<Verdict, OracleError> { Ok(Verdict::new(label)) }
    }

    #[test]
    fn test_names_keep_registration_order() {
        let registry = OracleRegistry::builder()
            .register("zeta", always(ProgressLabel::Ongoing))
            .register("alpha", always(ProgressLabel::NearEnd))
            .build()
            .unwrap();
        assert_eq!(registry.names().collect::<Vec<_>>(), ["zeta", "alpha"]);
        assert_eq!(registry.primary(), Some("zeta"));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let result = OracleRegistry::builder()
            .register("same", always(ProgressLabel::Ongoing))
            .register("same", always(ProgressLabel::Terminal))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_primary_rejected() {
        let result = OracleRegistry::builder()
            .register("a", always(ProgressLabel::Ongoing))
            .primary("b")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_failures_become_error_verdicts() {
        let registry = OracleRegistry::builder()
            .register("ok", always(ProgressLabel::Ongoing))
            .register("fails", |_: &Board| -> Result<Verdict, OracleError> {
                Err(OracleError::new("model not loaded"))
            })
            .register("panics", |_: &Board| -> Result<Verdict, OracleError> {
                panic!("feature encoder exploded")
            })
            .register("after", always(ProgressLabel::NearEnd))
            .build()
            .unwrap();

        let verdicts = registry.evaluate(&Board::new());
        assert_eq!(verdicts.len(), 4);
        assert_eq!(verdicts[0], Verdict::new(ProgressLabel::Ongoing));
        assert!(verdicts[1].is_error());
        assert!(verdicts[2].is_error());
        assert_eq!(verdicts[2].confidence, Some(0.0));
        assert_eq!(verdicts[3], Verdict::new(ProgressLabel::NearEnd));
    }

    #[test]
    fn test_error_never_agrees() {
        for label in [
            ProgressLabel::Ongoing,
            ProgressLabel::NearEnd,
            ProgressLabel::Terminal,
        ] {
            assert!(!Verdict::error().agrees_with(label));
            assert!(Verdict::with_confidence(label, 0.2).agrees_with(label));
        }
    }

    #[test]
    fn test_confidence_is_clamped() {
        let verdict = Verdict::with_confidence(ProgressLabel::Terminal, 1.7);
        assert_eq!(verdict.confidence, Some(1.0));
    }

    #[test]
    fn test_non_finite_confidence_is_dropped() {
        for bad in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let verdict = Verdict::with_confidence(ProgressLabel::Ongoing, bad);
            assert_eq!(verdict, Verdict::new(ProgressLabel::Ongoing));
        }
    }

    #[test]
    fn test_verdict_label_serializes_as_string() {
        let json = serde_json::to_string(&Verdict::error()).unwrap();
        assert_eq!(json, r#"{"label":"error","confidence":0.0}"#);
    }
}
