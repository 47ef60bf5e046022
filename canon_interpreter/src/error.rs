use std::path::PathBuf;

use thiserror::Error;

use crate::canon::PhaseId;

/// Configuration errors raised while loading rule sets or engine settings.
///
/// Every variant is fatal for the call that produced it: evaluation never
/// starts against a partially loaded rule set.
#[derive(Debug, Error)]
pub enum CanonError {
    /// Backing file could not be read.
    #[error("reading {}: {source}", path.display())]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Rule source is not valid JSON or lacks the expected document shape.
    #[error("malformed rule source: {0}")]
    Malformed(#[from] serde_json::Error),
    /// A phase block or canon record lacks a required field.
    #[error("{phase}: canon `{canon}` is missing required field `{field}`")]
    MissingField {
        /// Phase label as written in the source.
        phase: String,
        /// Canon name, or its position when the name itself is missing.
        canon: String,
        /// Missing field path.
        field: &'static str,
    },
    /// Trigger type outside the supported set.
    #[error("{phase}: canon `{canon}` has unknown trigger type `{kind}`")]
    UnknownTrigger {
        /// Phase label.
        phase: String,
        /// Canon name.
        canon: String,
        /// Offending trigger type.
        kind: String,
    },
    /// A keyword is empty after trimming and would match every text.
    #[error("{phase}: canon `{canon}` declares an empty keyword")]
    EmptyKeyword {
        /// Phase label.
        phase: String,
        /// Canon name.
        canon: String,
    },
    /// Phase label outside `phase_0..phase_3`.
    #[error("unknown phase `{0}`")]
    UnknownPhase(String),
    /// A phase was never declared.
    #[error("rule source does not declare {0}")]
    MissingPhase(PhaseId),
    /// A phase was declared twice.
    #[error("rule source declares {0} more than once")]
    DuplicatePhase(PhaseId),
    /// Two canons in one phase share a name.
    #[error("{phase}: duplicate canon name `{name}`")]
    DuplicateCanon {
        /// Phase holding the duplicates.
        phase: PhaseId,
        /// Repeated name.
        name: String,
    },
    /// Engine configuration failed validation.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    /// Engine configuration file is not valid TOML.
    #[error("parsing engine configuration: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl CanonError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
