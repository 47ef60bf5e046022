use serde::{Deserialize, Serialize};

use crate::canon::{Canon, PhaseId};

/// A scored candidate reading with its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Interpretation {
    /// Reading text, derived from the canon that created it.
    #[serde(rename = "interpretation")]
    pub text: String,
    /// Accumulated score.
    pub score: f64,
    /// Contributing canon names, append-only.
    pub applied_canons: Vec<String>,
    /// Explanations, append-only.
    pub reasoning: Vec<String>,
    /// Phase that created the reading.
    pub phase: PhaseId,
}

impl Interpretation {
    /// Reading created by a triggered canon, scored at the canon's weight.
    #[must_use]
    pub fn from_canon(canon: &Canon, phase: PhaseId) -> Self {
        Self {
            text: reading_text(&canon.name),
            score: canon.weight,
            applied_canons: vec![canon.name.clone()],
            reasoning: vec![canon.explanation_short.clone()],
            phase,
        }
    }

    /// Applies a terminal-phase adjustment.
    pub fn adjust(&mut self, canon: &Canon) {
        self.score += canon.adjust;
        self.applied_canons.push(canon.name.clone());
        self.reasoning.push(canon.explanation_short.clone());
    }
}

/// Text of the reading a canon produces.
#[must_use]
pub fn reading_text(canon_name: &str) -> String {
    format!("Reading adjusted by {canon_name}")
}

/// Interpretations accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpretationLedger {
    entries: Vec<Interpretation>,
}

impl InterpretationLedger {
    /// Empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a reading; ranking is restored by [`InterpretationLedger::rank`].
    pub fn push(&mut self, interpretation: Interpretation) {
        self.entries.push(interpretation);
    }

    /// Stable sort by score, highest first. Ties keep insertion order.
    pub fn rank(&mut self) {
        self.entries.sort_by(|a, b| b.score.total_cmp(&a.score));
    }

    /// Mutable access for in-place adjustment. The slice length is fixed, so
    /// callers cannot add or remove readings through it.
    pub fn entries_mut(&mut self) -> &mut [Interpretation] {
        &mut self.entries
    }

    /// Readings in current order.
    #[must_use]
    pub fn as_slice(&self) -> &[Interpretation] {
        &self.entries
    }

    /// Highest-ranked reading, if ranked and non-empty.
    #[must_use]
    pub fn top(&self) -> Option<&Interpretation> {
        self.entries.first()
    }

    /// Number of readings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no reading exists yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Consumes the ledger.
    #[must_use]
    pub fn into_vec(self) -> Vec<Interpretation> {
        self.entries
    }
}
