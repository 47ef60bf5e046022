use std::{fmt, str::FromStr};

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::error::CanonError;

/// Ordered evaluation stage. `Phase3` is the terminal scoring phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PhaseId {
    /// Threshold canons.
    #[serde(rename = "phase_0")]
    Phase0,
    /// Textual canons.
    #[serde(rename = "phase_1")]
    Phase1,
    /// Contextual canons.
    #[serde(rename = "phase_2")]
    Phase2,
    /// Score adjustments only; never creates interpretations.
    #[serde(rename = "phase_3")]
    Phase3,
}

impl PhaseId {
    /// Every phase in evaluation order.
    pub const ALL: [Self; 4] = [Self::Phase0, Self::Phase1, Self::Phase2, Self::Phase3];

    /// Wire label (`phase_0` ..).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Phase0 => "phase_0",
            Self::Phase1 => "phase_1",
            Self::Phase2 => "phase_2",
            Self::Phase3 => "phase_3",
        }
    }

    /// Position in [`PhaseId::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Whether this is the adjust-only terminal phase.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Phase3)
    }

    /// Following phase, if any.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Phase0 => Some(Self::Phase1),
            Self::Phase1 => Some(Self::Phase2),
            Self::Phase2 => Some(Self::Phase3),
            Self::Phase3 => None,
        }
    }

    /// Phases strictly after this one, in order.
    pub fn later(self) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().skip(self.index() + 1)
    }
}

impl fmt::Display for PhaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PhaseId {
    type Err = CanonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|phase| phase.as_str() == s.trim())
            .ok_or_else(|| CanonError::UnknownPhase(s.to_string()))
    }
}

/// Condition under which a canon applies.
///
/// Keywords are stored case-folded and de-duplicated in declaration order.
/// An empty keyword matches every text; rule sources loaded from JSON reject
/// one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Trigger {
    /// Applies unconditionally.
    Always,
    /// Applies when any keyword occurs in the rule text.
    Keyword {
        /// Case-folded keywords.
        keywords: IndexSet<String>,
    },
    /// Applies when any keyword occurs in the rule text, or the claim has at
    /// least one word.
    KeywordOrContext {
        /// Case-folded keywords.
        keywords: IndexSet<String>,
    },
}

impl Trigger {
    /// Builds a keyword trigger, case-folding the keywords.
    pub fn keyword<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::Keyword {
            keywords: fold_keywords(keywords),
        }
    }

    /// Builds a keyword-or-context trigger, case-folding the keywords.
    pub fn keyword_or_context<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::KeywordOrContext {
            keywords: fold_keywords(keywords),
        }
    }

    /// Keyword set; `None` for [`Trigger::Always`].
    #[must_use]
    pub fn keywords(&self) -> Option<&IndexSet<String>> {
        match self {
            Self::Always => None,
            Self::Keyword { keywords } | Self::KeywordOrContext { keywords } => Some(keywords),
        }
    }

    /// Wire name of the trigger type.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::Keyword { .. } => "keyword",
            Self::KeywordOrContext { .. } => "keyword_or_context",
        }
    }
}

pub(crate) fn fold_keywords<I, S>(keywords: I) -> IndexSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| k.as_ref().trim().to_lowercase())
        .collect()
}

/// A weighted interpretive rule. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Canon {
    /// Unique within its phase.
    pub name: String,
    /// Applicability condition.
    pub trigger: Trigger,
    /// Initial score of the interpretation this canon creates.
    pub weight: f64,
    /// Score delta applied in the terminal phase.
    #[serde(default)]
    pub adjust: f64,
    /// One-line rationale appended to reasoning.
    pub explanation_short: String,
}

impl Canon {
    /// Creates a canon with no terminal adjustment.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        trigger: Trigger,
        weight: f64,
        explanation_short: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            trigger,
            weight,
            adjust: 0.0,
            explanation_short: explanation_short.into(),
        }
    }

    /// Sets the terminal-phase adjustment.
    #[must_use]
    pub fn with_adjust(mut self, adjust: f64) -> Self {
        self.adjust = adjust;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phase_order_and_terminal() {
        assert_eq!(PhaseId::Phase0.next(), Some(PhaseId::Phase1));
        assert_eq!(PhaseId::Phase3.next(), None);
        assert!(PhaseId::Phase3.is_terminal());
        assert!(!PhaseId::Phase2.is_terminal());
        let later: Vec<_> = PhaseId::Phase1.later().collect();
        assert_eq!(later, vec![PhaseId::Phase2, PhaseId::Phase3]);
        assert_eq!(PhaseId::Phase3.later().count(), 0);
    }

    #[test]
    fn phase_labels_parse() {
        assert_eq!("phase_2".parse::<PhaseId>().unwrap(), PhaseId::Phase2);
        assert!(matches!(
            "phase_9".parse::<PhaseId>(),
            Err(CanonError::UnknownPhase(_))
        ));
        assert_eq!(
            serde_json::to_string(&PhaseId::Phase1).unwrap(),
            "\"phase_1\""
        );
    }

    #[test]
    fn keywords_are_folded_and_deduplicated() {
        let trigger = Trigger::keyword(["Vehicle", "vehicle ", "PARK"]);
        let keywords = trigger.keywords().unwrap();
        assert_eq!(
            keywords.iter().collect::<Vec<_>>(),
            vec!["vehicle", "park"]
        );
        assert!(Trigger::Always.keywords().is_none());
    }
}
