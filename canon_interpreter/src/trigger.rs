//! Canon applicability tests.

use indexmap::IndexSet;

use crate::canon::{Canon, Trigger};

/// Whether `canon` applies to the claim / rule-text pair.
///
/// `keyword_or_context` passes for any claim containing at least one word,
/// whatever the rule text says.
#[must_use]
pub fn evaluates(canon: &Canon, claim: &str, rule_text: &str) -> bool {
    match &canon.trigger {
        Trigger::Always => true,
        Trigger::Keyword { keywords } => mentions_any(keywords, &rule_text.to_lowercase()),
        Trigger::KeywordOrContext { keywords } => {
            mentions_any(keywords, &rule_text.to_lowercase()) || has_context(claim)
        }
    }
}

/// Whether a terminal-phase canon adjusts an interpretation with the given
/// text. `always` canons adjust every interpretation; the other variants need
/// a keyword hit in the text.
#[must_use]
pub fn adjusts(canon: &Canon, interpretation_text: &str) -> bool {
    canon.trigger.keywords().map_or(true, |keywords| {
        mentions_any(keywords, &interpretation_text.to_lowercase())
    })
}

fn mentions_any(keywords: &IndexSet<String>, folded_text: &str) -> bool {
    keywords.iter().any(|keyword| folded_text.contains(keyword.as_str()))
}

fn has_context(claim: &str) -> bool {
    claim.split_whitespace().next().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canon(trigger: Trigger) -> Canon {
        Canon::new("Test Canon", trigger, 10.0, "test")
    }

    #[test]
    fn always_ignores_inputs() {
        let c = canon(Trigger::Always);
        assert!(evaluates(&c, "", ""));
        assert!(evaluates(&c, "claim", "rule"));
    }

    #[test]
    fn keyword_is_case_insensitive_substring_of_rule_text() {
        let c = canon(Trigger::keyword(["Vehicle"]));
        assert!(evaluates(&c, "", "No VEHICLES in the park"));
        assert!(!evaluates(&c, "vehicle", "No bicycles in the park"));
    }

    #[test]
    fn keyword_with_empty_set_never_fires() {
        let c = canon(Trigger::keyword(Vec::<String>::new()));
        assert!(!evaluates(&c, "anything", "anything"));
    }

    #[test]
    fn keyword_or_context_fires_for_any_non_empty_claim() {
        let c = canon(Trigger::keyword_or_context(["statute"]));
        assert!(evaluates(&c, "my car", "no keyword here"));
        assert!(evaluates(&c, "", "the Statute says"));
        assert!(!evaluates(&c, "   \t ", "no keyword here"));
        assert!(!evaluates(&c, "", ""));
    }

    #[test]
    fn terminal_adjustment_matches_interpretation_text() {
        let c = canon(Trigger::keyword(["lenity"]));
        assert!(adjusts(&c, "Reading adjusted by Rule of Lenity"));
        assert!(!adjusts(&c, "Reading adjusted by Whole-Text Canon"));
        assert!(adjusts(&canon(Trigger::Always), "Reading adjusted by X"));
    }
}
