use std::{
    collections::HashSet,
    fs,
    io::Read,
    path::{Path, PathBuf},
    sync::Arc,
};

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::Deserialize;

use crate::{
    canon::{fold_keywords, Canon, PhaseId, Trigger},
    error::CanonError,
};

const REFERENCE_RULES: &str = include_str!("../data/CanonInterpretation.json");

/// Loaded rule set, partitioned by phase. Read-only after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonLibrary {
    phases: IndexMap<PhaseId, Vec<Canon>>,
}

impl CanonLibrary {
    /// Builds a library from canons grouped by phase. Phases not supplied are
    /// empty; duplicate names within a phase are rejected.
    pub fn new<I>(phases: I) -> Result<Self, CanonError>
    where
        I: IntoIterator<Item = (PhaseId, Vec<Canon>)>,
    {
        let mut grouped: IndexMap<PhaseId, Vec<Canon>> =
            PhaseId::ALL.into_iter().map(|p| (p, Vec::new())).collect();
        for (phase, canons) in phases {
            check_unique_names(phase, &canons)?;
            grouped.insert(phase, canons);
        }
        Ok(Self { phases: grouped })
    }

    /// Library with no canons in any phase.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            phases: PhaseId::ALL.into_iter().map(|p| (p, Vec::new())).collect(),
        }
    }

    /// Bundled reference rule set.
    pub fn reference() -> Result<Self, CanonError> {
        Self::from_json_str(REFERENCE_RULES)
    }

    /// Loads a rule source file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CanonError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| CanonError::io(path, err))?;
        Self::from_json_str(&raw)
    }

    /// Parses a rule source from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, CanonError> {
        let document: RawDocument = serde_json::from_reader(reader)?;
        Self::from_document(document)
    }

    /// Parses a rule source document.
    pub fn from_json_str(raw: &str) -> Result<Self, CanonError> {
        let document: RawDocument = serde_json::from_str(raw)?;
        Self::from_document(document)
    }

    fn from_document(document: RawDocument) -> Result<Self, CanonError> {
        let mut phases: IndexMap<PhaseId, Vec<Canon>> = IndexMap::new();
        for (position, block) in document.legal_canons.phases.into_iter().enumerate() {
            let label = block.phase.ok_or_else(|| CanonError::MissingField {
                phase: format!("phase block #{position}"),
                canon: "-".into(),
                field: "phase",
            })?;
            let phase: PhaseId = label.parse()?;
            let raw_canons = block.canons.ok_or_else(|| CanonError::MissingField {
                phase: label.clone(),
                canon: "-".into(),
                field: "canons",
            })?;
            let canons = raw_canons
                .into_iter()
                .enumerate()
                .map(|(idx, raw)| raw.into_canon(&label, idx))
                .collect::<Result<Vec<_>, _>>()?;
            if phases.contains_key(&phase) {
                return Err(CanonError::DuplicatePhase(phase));
            }
            check_unique_names(phase, &canons)?;
            phases.insert(phase, canons);
        }
        let mut ordered = IndexMap::with_capacity(PhaseId::ALL.len());
        for phase in PhaseId::ALL {
            let canons = phases
                .swap_remove(&phase)
                .ok_or(CanonError::MissingPhase(phase))?;
            ordered.insert(phase, canons);
        }
        Ok(Self { phases: ordered })
    }

    /// Canons of one phase, in declaration order.
    #[must_use]
    pub fn phase(&self, phase: PhaseId) -> &[Canon] {
        self.phases.get(&phase).map_or(&[][..], Vec::as_slice)
    }

    /// Every canon in the phases strictly after `phase`.
    pub fn canons_after(&self, phase: PhaseId) -> impl Iterator<Item = &Canon> + '_ {
        phase.later().flat_map(move |later| self.phase(later).iter())
    }

    /// Phases with their canons, in evaluation order.
    pub fn iter(&self) -> impl Iterator<Item = (PhaseId, &[Canon])> + '_ {
        self.phases.iter().map(|(phase, canons)| (*phase, canons.as_slice()))
    }

    /// Total canons across all phases.
    #[must_use]
    pub fn canon_count(&self) -> usize {
        self.phases.values().map(Vec::len).sum()
    }
}

fn check_unique_names(phase: PhaseId, canons: &[Canon]) -> Result<(), CanonError> {
    let mut seen = HashSet::with_capacity(canons.len());
    for canon in canons {
        if !seen.insert(canon.name.as_str()) {
            return Err(CanonError::DuplicateCanon {
                phase,
                name: canon.name.clone(),
            });
        }
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "Legal_Canons")]
    legal_canons: RawCanonSet,
}

#[derive(Debug, Deserialize)]
struct RawCanonSet {
    phases: Vec<RawPhase>,
}

#[derive(Debug, Deserialize)]
struct RawPhase {
    phase: Option<String>,
    canons: Option<Vec<RawCanon>>,
}

#[derive(Debug, Deserialize)]
struct RawCanon {
    name: Option<String>,
    trigger: Option<RawTrigger>,
    weight: Option<f64>,
    adjust: Option<f64>,
    explanation_short: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTrigger {
    #[serde(rename = "type")]
    kind: Option<String>,
    keywords: Option<Vec<String>>,
}

impl RawCanon {
    fn into_canon(self, phase: &str, position: usize) -> Result<Canon, CanonError> {
        let name = self.name.ok_or_else(|| CanonError::MissingField {
            phase: phase.to_string(),
            canon: format!("#{position}"),
            field: "name",
        })?;
        let missing = |field: &'static str| CanonError::MissingField {
            phase: phase.to_string(),
            canon: name.clone(),
            field,
        };
        let raw_trigger = self.trigger.ok_or_else(|| missing("trigger"))?;
        let kind = raw_trigger.kind.ok_or_else(|| missing("trigger.type"))?;
        let trigger = match kind.as_str() {
            "always" => Trigger::Always,
            "keyword" | "keyword_or_context" => {
                let keywords = raw_trigger
                    .keywords
                    .ok_or_else(|| missing("trigger.keywords"))?;
                if keywords.iter().any(|keyword| keyword.trim().is_empty()) {
                    return Err(CanonError::EmptyKeyword {
                        phase: phase.to_string(),
                        canon: name.clone(),
                    });
                }
                let keywords = fold_keywords(keywords);
                if kind == "keyword" {
                    Trigger::Keyword { keywords }
                } else {
                    Trigger::KeywordOrContext { keywords }
                }
            }
            _ => {
                return Err(CanonError::UnknownTrigger {
                    phase: phase.to_string(),
                    canon: name.clone(),
                    kind: kind.clone(),
                })
            }
        };
        let weight = self.weight.ok_or_else(|| missing("weight"))?;
        let explanation_short = self
            .explanation_short
            .ok_or_else(|| missing("explanation_short"))?;
        Ok(Canon {
            name,
            trigger,
            weight,
            adjust: self.adjust.unwrap_or_default(),
            explanation_short,
        })
    }
}

/// Load-once, read-many handle over a rule set.
///
/// Evaluations take an `Arc` snapshot and never observe a half-applied reload.
#[derive(Debug)]
pub struct SharedCanonStore {
    source: Option<PathBuf>,
    current: RwLock<Arc<CanonLibrary>>,
}

impl SharedCanonStore {
    /// Wraps an already loaded library; [`SharedCanonStore::reload`] re-reads nothing.
    #[must_use]
    pub fn new(library: CanonLibrary) -> Self {
        Self {
            source: None,
            current: RwLock::new(Arc::new(library)),
        }
    }

    /// Loads `path` and remembers it for later reloads.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CanonError> {
        let path = path.into();
        let library = CanonLibrary::load(&path)?;
        Ok(Self {
            source: Some(path),
            current: RwLock::new(Arc::new(library)),
        })
    }

    /// Current rule set.
    #[must_use]
    pub fn snapshot(&self) -> Arc<CanonLibrary> {
        Arc::clone(&self.current.read())
    }

    /// Backing file, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Re-reads the backing file. The previous snapshot stays active when
    /// parsing fails. Returns `false` for stores without a backing file.
    pub fn reload(&self) -> Result<bool, CanonError> {
        let Some(path) = &self.source else {
            return Ok(false);
        };
        let library = CanonLibrary::load(path)?;
        *self.current.write() = Arc::new(library);
        Ok(true)
    }

    /// Swaps in a library built elsewhere.
    pub fn replace(&self, library: CanonLibrary) {
        *self.current.write() = Arc::new(library);
    }
}
