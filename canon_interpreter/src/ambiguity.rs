//! Advisory ambiguity heuristic. Never gates phase progression.

use std::collections::HashSet;

use crate::confidence::round2;

/// Terms whose presence in a rule text signals open-textured language.
pub const VAGUE_TERMS: [&str; 5] = ["reasonable", "liberty", "justice", "fair", "etc"];

const VAGUE_TERM_PENALTY: f64 = 0.2;

/// `1 - overlap` plus a penalty per vague term present in the rule text,
/// rounded to two decimals and capped at 1.0.
///
/// Overlap is `|claim ∩ rule| / max(|rule|, 1)` over case-folded,
/// whitespace-separated words.
#[must_use]
pub fn score(claim: &str, rule_text: &str) -> f64 {
    let claim_lower = claim.to_lowercase();
    let rule_lower = rule_text.to_lowercase();
    let claim_words: HashSet<&str> = claim_lower.split_whitespace().collect();
    let rule_words: HashSet<&str> = rule_lower.split_whitespace().collect();

    #[allow(clippy::cast_precision_loss)]
    let overlap = claim_words.intersection(&rule_words).count() as f64
        / rule_words.len().max(1) as f64;
    let vague_hits = VAGUE_TERMS
        .iter()
        .filter(|term| rule_lower.contains(*term))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let raw = (1.0 - overlap) + vague_hits as f64 * VAGUE_TERM_PENALTY;
    round2(raw).clamp(0.0, 1.0)
}

/// Lower-cases `text` and drops everything except word characters and
/// whitespace.
#[must_use]
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
        .collect()
}
