use crate::ledger::Interpretation;

/// Rounds to the nearest two-decimal value. Exact ties go to the even digit,
/// and values just below a tie in binary round down.
#[must_use]
pub fn round2(value: f64) -> f64 {
    // Float formatting is correctly rounded on the exact binary value.
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Confidence after observing `ranked` (sorted highest score first).
///
/// Fewer than two readings means nothing competes, so confidence is 1.0.
/// Otherwise half the normalised gap between the top two scores is added.
#[must_use]
pub fn next_confidence(current: f64, ranked: &[Interpretation], total_score_cap: f64) -> f64 {
    let [top, runner_up, ..] = ranked else {
        return 1.0;
    };
    let gap = (top.score - runner_up.score).max(0.0);
    round2(current + (gap / total_score_cap) * 0.5).clamp(0.0, 1.0)
}

/// Running confidence for a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceTracker {
    value: f64,
    total_score_cap: f64,
}

impl ConfidenceTracker {
    /// Starts at `baseline`.
    #[must_use]
    pub fn new(baseline: f64, total_score_cap: f64) -> Self {
        Self {
            value: baseline.clamp(0.0, 1.0),
            total_score_cap,
        }
    }

    /// Folds in a fresh ranking. Never lowers the value.
    pub fn update(&mut self, ranked: &[Interpretation]) -> f64 {
        let next = next_confidence(self.value, ranked, self.total_score_cap);
        self.value = next.max(self.value);
        self.value
    }

    /// Current value.
    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canon::PhaseId;

    fn scored(score: f64) -> Interpretation {
        Interpretation {
            text: format!("reading {score}"),
            score,
            applied_canons: Vec::new(),
            reasoning: Vec::new(),
            phase: PhaseId::Phase0,
        }
    }

    #[test]
    fn fewer_than_two_readings_force_full_confidence() {
        assert_eq!(next_confidence(0.2, &[], 500.0), 1.0);
        assert_eq!(next_confidence(0.2, &[scored(10.0)], 500.0), 1.0);
    }

    #[test]
    fn small_gap_barely_moves_confidence() {
        // (2 / 500) * 0.5 = 0.002, lost to rounding.
        let ranked = [scored(50.0), scored(48.0)];
        assert_eq!(next_confidence(0.2, &ranked, 500.0), 0.2);
    }

    #[test]
    fn gap_is_normalised_by_cap() {
        let ranked = [scored(300.0), scored(100.0)];
        assert_eq!(next_confidence(0.2, &ranked, 500.0), 0.4);
        assert_eq!(next_confidence(0.2, &ranked, 250.0), 0.6);
    }

    #[test]
    fn result_is_capped_at_one() {
        let ranked = [scored(5000.0), scored(0.0)];
        assert_eq!(next_confidence(0.9, &ranked, 500.0), 1.0);
    }

    #[test]
    fn tracker_is_monotonic() {
        let mut tracker = ConfidenceTracker::new(0.2, 500.0);
        assert_eq!(tracker.update(&[scored(120.0), scored(20.0)]), 0.3);
        // Rounding could never pull it back down.
        assert_eq!(tracker.update(&[scored(20.0), scored(20.0)]), 0.3);
        assert_eq!(tracker.update(&[scored(20.0)]), 1.0);
        assert_eq!(tracker.update(&[scored(20.0), scored(19.0)]), 1.0);
        assert_eq!(tracker.value(), 1.0);
    }

    #[test]
    fn round2_behaves_like_two_decimal_rounding() {
        assert_eq!(round2(0.666_666), 0.67);
        assert_eq!(round2(0.204), 0.2);
        assert_eq!(round2(1.0), 1.0);
        // 0.625 is exact in binary: tie goes to the even digit.
        assert_eq!(round2(0.625), 0.62);
        assert_eq!(round2(0.375), 0.38);
    }

    #[test]
    fn half_cent_gaps_round_on_the_binary_value() {
        // 0.2 + gap / 1000 lands just under the .xx5 tie for these gaps.
        for (gap, expected) in [(45.0, 0.24), (105.0, 0.3), (145.0, 0.34)] {
            let ranked = [scored(gap), scored(0.0)];
            assert_eq!(next_confidence(0.2, &ranked, 500.0), expected, "gap {gap}");
        }
    }
}
