//! Early-stop policy: the lookahead safeguard and the per-phase decision.

use serde::{Deserialize, Serialize};

use crate::{canon::Canon, config::EngineConfig, ledger::Interpretation};

/// What the orchestrator does after a phase has been scored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseDecision {
    /// Log the phase snapshot and move on (or finish after the terminal phase).
    Continue,
    /// Confident, but the next phase holds a decisive canon: move on without
    /// logging a snapshot.
    Escalate,
    /// Confident and nothing ahead can overturn the ranking: stop without
    /// logging a snapshot.
    Halt,
}

/// Whether the heaviest canon of the next phase could still be decisive.
///
/// The current leader is accepted for contract parity but does not influence
/// the result. An empty next phase never escalates.
#[must_use]
pub fn should_escalate(
    next_phase_canons: &[Canon],
    _current_top: Option<&Interpretation>,
    margin_threshold: f64,
) -> bool {
    next_phase_canons
        .iter()
        .map(|canon| canon.weight)
        .max_by(f64::total_cmp)
        .is_some_and(|heaviest| heaviest >= margin_threshold)
}

/// Decides how to proceed once a phase has been ranked and its confidence
/// computed. `next_phase` is `None` for the terminal phase.
#[must_use]
pub fn decide(
    confidence: f64,
    next_phase: Option<&[Canon]>,
    current_top: Option<&Interpretation>,
    config: &EngineConfig,
) -> PhaseDecision {
    match next_phase {
        Some(next) if confidence >= config.confidence_threshold => {
            if should_escalate(next, current_top, config.lookahead_margin) {
                PhaseDecision::Escalate
            } else {
                PhaseDecision::Halt
            }
        }
        _ => PhaseDecision::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::Trigger;

    fn weighted(weight: f64) -> Canon {
        Canon::new(format!("w{weight}"), Trigger::Always, weight, "-")
    }

    #[test]
    fn escalates_only_when_heaviest_canon_meets_margin() {
        assert!(should_escalate(&[weighted(3.0), weighted(10.0)], None, 10.0));
        assert!(!should_escalate(&[weighted(3.0), weighted(9.5)], None, 10.0));
        assert!(!should_escalate(&[], None, 0.0));
    }

    #[test]
    fn below_threshold_always_continues() {
        let config = EngineConfig::default();
        let next = [weighted(100.0)];
        assert_eq!(decide(0.5, Some(&next[..]), None, &config), PhaseDecision::Continue);
        assert_eq!(decide(0.89, Some(&[][..]), None, &config), PhaseDecision::Continue);
    }

    #[test]
    fn confident_phase_escalates_or_halts() {
        let config = EngineConfig::default();
        assert_eq!(
            decide(0.9, Some(&[weighted(12.0)][..]), None, &config),
            PhaseDecision::Escalate
        );
        assert_eq!(
            decide(1.0, Some(&[weighted(4.0)][..]), None, &config),
            PhaseDecision::Halt
        );
        assert_eq!(decide(1.0, Some(&[][..]), None, &config), PhaseDecision::Halt);
    }

    #[test]
    fn terminal_phase_never_consults_lookahead() {
        let config = EngineConfig::default();
        assert_eq!(decide(1.0, None, None, &config), PhaseDecision::Continue);
    }
}
