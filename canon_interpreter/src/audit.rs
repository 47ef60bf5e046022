use serde::{Deserialize, Serialize};

use crate::{canon::Canon, ledger::Interpretation};

/// Outcome label of the post-run stress test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditStatus {
    /// No unused canon could move the leader by the safety margin.
    Stable,
    /// The strongest unused canon could.
    InstabilityDetected,
}

/// Result of stress-testing the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    /// Overall verdict.
    pub status: AuditStatus,
    /// Strongest unused canon, when one was tested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tested_canon: Option<String>,
    /// Leader's score had that canon also applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hypothetical_score: Option<f64>,
    /// Whether the hypothetical gain reaches the safety margin.
    pub impact_detected: bool,
}

impl AuditResult {
    /// Verdict when there is nothing to test.
    #[must_use]
    pub const fn stable() -> Self {
        Self {
            status: AuditStatus::Stable,
            tested_canon: None,
            hypothetical_score: None,
            impact_detected: false,
        }
    }
}

/// Adds the weight of the heaviest unused canon (first declared wins ties) to
/// the leader's score and flags instability when the gain reaches
/// `safety_margin`. Reads only.
#[must_use]
pub fn audit(ranked: &[Interpretation], unused: &[&Canon], safety_margin: f64) -> AuditResult {
    let (Some(top), Some(strongest)) = (
        ranked.first(),
        unused
            .iter()
            .copied()
            .reduce(|best, canon| if canon.weight > best.weight { canon } else { best }),
    ) else {
        return AuditResult::stable();
    };
    let hypothetical = top.score + strongest.weight;
    let impact_detected = hypothetical - top.score >= safety_margin;
    AuditResult {
        status: if impact_detected {
            AuditStatus::InstabilityDetected
        } else {
            AuditStatus::Stable
        },
        tested_canon: Some(strongest.name.clone()),
        hypothetical_score: Some(hypothetical),
        impact_detected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::{PhaseId, Trigger};

    fn leader(score: f64) -> Interpretation {
        Interpretation {
            text: "Reading adjusted by Leader".into(),
            score,
            applied_canons: vec!["Leader".into()],
            reasoning: Vec::new(),
            phase: PhaseId::Phase0,
        }
    }

    fn canon(name: &str, weight: f64) -> Canon {
        Canon::new(name, Trigger::Always, weight, "-")
    }

    #[test]
    fn nothing_to_test_is_stable() {
        let spare = canon("Lenity", 50.0);
        assert_eq!(audit(&[], &[&spare], 20.0), AuditResult::stable());
        assert_eq!(audit(&[leader(10.0)], &[], 20.0), AuditResult::stable());
    }

    #[test]
    fn heavy_unused_canon_is_flagged() {
        let light = canon("Surplusage", 5.0);
        let heavy = canon("Lenity", 28.0);
        let result = audit(&[leader(40.0)], &[&light, &heavy], 20.0);
        assert_eq!(result.status, AuditStatus::InstabilityDetected);
        assert_eq!(result.tested_canon.as_deref(), Some("Lenity"));
        assert_eq!(result.hypothetical_score, Some(68.0));
        assert!(result.impact_detected);
    }

    #[test]
    fn light_unused_canon_is_stable_but_reported() {
        let light = canon("Surplusage", 19.0);
        let result = audit(&[leader(40.0)], &[&light], 20.0);
        assert_eq!(result.status, AuditStatus::Stable);
        assert_eq!(result.tested_canon.as_deref(), Some("Surplusage"));
        assert!(!result.impact_detected);
    }

    #[test]
    fn margin_boundary_is_inclusive() {
        let exact = canon("Whole Text", 20.0);
        assert!(audit(&[leader(1.0)], &[&exact], 20.0).impact_detected);
    }

    #[test]
    fn serializes_status_in_snake_case() {
        let value = serde_json::to_value(AuditResult::stable()).unwrap();
        assert_eq!(value, serde_json::json!({ "status": "stable", "impact_detected": false }));
    }
}
