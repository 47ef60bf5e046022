//! Phase orchestration: drives the canon phases in order and decides when to
//! stop.

use serde::{Deserialize, Serialize};

use crate::{
    ambiguity,
    audit::{audit, AuditResult},
    canon::{Canon, PhaseId},
    confidence::ConfidenceTracker,
    config::EngineConfig,
    ledger::{Interpretation, InterpretationLedger},
    lookahead::{decide, PhaseDecision},
    store::CanonLibrary,
    trigger,
};

/// Explain-log entry recorded for a phase that did not stop early.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSnapshot {
    /// Phase evaluated.
    pub phase: PhaseId,
    /// Canons that created (or, in the terminal phase, adjusted) readings.
    pub triggered_canons: Vec<String>,
    /// Ranking after the phase.
    pub interpretations: Vec<Interpretation>,
    /// Confidence after the phase.
    pub confidence: f64,
}

/// Everything one evaluation produced, before rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Advisory overlap/vagueness score.
    pub ambiguity_score: f64,
    /// Final confidence.
    pub confidence: f64,
    /// Phases entered, in order.
    pub phases_applied: Vec<PhaseId>,
    /// Whether the terminal phase adjusted any reading.
    pub override_event: bool,
    /// Final ranking, highest score first.
    pub ranked: Vec<Interpretation>,
    /// Per-phase snapshots.
    pub explain_log: Vec<PhaseSnapshot>,
    /// Stress test against the strongest canon never reached.
    pub audit: AuditResult,
}

impl RunOutcome {
    /// Highest-ranked reading.
    #[must_use]
    pub fn top(&self) -> Option<&Interpretation> {
        self.ranked.first()
    }

    /// Phase at which the run stopped.
    #[must_use]
    pub fn last_phase(&self) -> Option<PhaseId> {
        self.phases_applied.last().copied()
    }
}

/// Runs the phased pipeline against one rule set. Holds no per-run state, so
/// one orchestrator may serve any number of evaluations.
#[derive(Debug, Clone, Copy)]
pub struct PhaseOrchestrator<'a> {
    library: &'a CanonLibrary,
    config: &'a EngineConfig,
}

impl<'a> PhaseOrchestrator<'a> {
    /// Binds a rule set and its tunables.
    #[must_use]
    pub const fn new(library: &'a CanonLibrary, config: &'a EngineConfig) -> Self {
        Self { library, config }
    }

    /// Evaluates `claim` against `rule_text`. Empty inputs are ordinary input.
    #[must_use]
    pub fn run(&self, claim: &str, rule_text: &str) -> RunOutcome {
        let ambiguity_score = ambiguity::score(claim, rule_text);
        let mut ledger = InterpretationLedger::new();
        let mut tracker =
            ConfidenceTracker::new(self.config.baseline_confidence, self.config.total_score_cap);
        let mut phases_applied = Vec::with_capacity(PhaseId::ALL.len());
        let mut explain_log = Vec::new();
        let mut override_event = false;

        for phase in PhaseId::ALL {
            let canons = self.library.phase(phase);
            let triggered = if phase.is_terminal() {
                let adjusted = apply_adjustments(&mut ledger, canons);
                override_event |= !adjusted.is_empty();
                adjusted
            } else {
                create_readings(&mut ledger, canons, phase, claim, rule_text)
            };
            phases_applied.push(phase);
            ledger.rank();
            let confidence = tracker.update(ledger.as_slice());

            let next = phase.next().map(|next| self.library.phase(next));
            match decide(confidence, next, ledger.top(), self.config) {
                PhaseDecision::Halt => break,
                PhaseDecision::Escalate => continue,
                PhaseDecision::Continue => {
                    explain_log.push(PhaseSnapshot {
                        phase,
                        triggered_canons: triggered,
                        interpretations: ledger.as_slice().to_vec(),
                        confidence,
                    });
                    if confidence >= self.config.confidence_threshold {
                        break;
                    }
                }
            }
        }

        ledger.rank();
        let remaining: Vec<&Canon> = phases_applied
            .last()
            .map(|reached| self.library.canons_after(*reached).collect())
            .unwrap_or_default();
        let audit = audit(
            ledger.as_slice(),
            &remaining,
            self.config.safety_margin_threshold,
        );

        RunOutcome {
            ambiguity_score,
            confidence: tracker.value(),
            phases_applied,
            override_event,
            ranked: ledger.into_vec(),
            explain_log,
            audit,
        }
    }
}

/// Adds one reading per triggered canon and returns the triggered names.
fn create_readings(
    ledger: &mut InterpretationLedger,
    canons: &[Canon],
    phase: PhaseId,
    claim: &str,
    rule_text: &str,
) -> Vec<String> {
    canons
        .iter()
        .filter(|canon| trigger::evaluates(canon, claim, rule_text))
        .map(|canon| {
            // Each reading starts from its own canon's explanation only; earlier
            // readings of the same phase do not leak into its reasoning.
            ledger.push(Interpretation::from_canon(canon, phase));
            canon.name.clone()
        })
        .collect()
}

/// Applies terminal adjustments in place and returns the names of canons
/// that adjusted at least one reading, in declaration order.
fn apply_adjustments(ledger: &mut InterpretationLedger, canons: &[Canon]) -> Vec<String> {
    let mut used = vec![false; canons.len()];
    for interpretation in ledger.entries_mut() {
        for (idx, canon) in canons.iter().enumerate() {
            if trigger::adjusts(canon, &interpretation.text) {
                interpretation.adjust(canon);
                used[idx] = true;
            }
        }
    }
    canons
        .iter()
        .zip(used)
        .filter_map(|(canon, used)| used.then(|| canon.name.clone()))
        .collect()
}
