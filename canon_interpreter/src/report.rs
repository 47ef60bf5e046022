use std::{convert::Infallible, fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    audit::AuditResult,
    canon::PhaseId,
    config::EngineConfig,
    ledger::Interpretation,
    pipeline::{PhaseOrchestrator, PhaseSnapshot, RunOutcome},
    store::CanonLibrary,
};

/// Requested output shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputMode {
    /// Full structured report.
    #[default]
    Json,
    /// One line naming the top reading.
    Summary,
    /// Explain log plus audit.
    Detailed,
}

impl OutputMode {
    /// Lower-case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Summary => "summary",
            Self::Detailed => "detailed",
        }
    }
}

impl fmt::Display for OutputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised names fall back to [`OutputMode::Json`].
impl FromStr for OutputMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "summary" => Self::Summary,
            "detailed" => Self::Detailed,
            _ => Self::Json,
        })
    }
}

/// `json` mode payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Advisory ambiguity in `[0, 1]`.
    pub ambiguity_score: f64,
    /// Final confidence in `[0, 1]`.
    pub confidence_score: f64,
    /// Phases entered.
    pub phases_applied: Vec<PhaseId>,
    /// Whether a terminal adjustment happened.
    pub override_event: bool,
    /// Leader, or `null` when nothing triggered.
    pub top_interpretation: Option<Interpretation>,
    /// Every other reading, ranked.
    pub alternatives: Vec<Interpretation>,
    /// Post-run stress test.
    pub safety_audit: AuditResult,
}

/// `detailed` mode payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailedReport {
    /// Per-phase snapshots.
    pub log: Vec<PhaseSnapshot>,
    /// Post-run stress test.
    pub audit: AuditResult,
}

/// Rendered evaluation result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InterpretationOutput {
    /// Structured report.
    Json(AnalysisReport),
    /// Summary line.
    Summary(String),
    /// Explain log and audit.
    Detailed(DetailedReport),
}

impl InterpretationOutput {
    /// Human-readable rendering: the summary line as-is, other shapes as
    /// pretty JSON.
    pub fn to_pretty_string(&self) -> serde_json::Result<String> {
        match self {
            Self::Summary(line) => Ok(line.clone()),
            other => serde_json::to_string_pretty(other),
        }
    }
}

impl RunOutcome {
    /// Summary line for the leader.
    #[must_use]
    pub fn summary(&self) -> String {
        self.top().map_or_else(
            || "Top Interpretation: none (Score: 0)".to_string(),
            |top| format!("Top Interpretation: {} (Score: {})", top.text, top.score),
        )
    }

    /// Renders the outcome in the requested shape.
    #[must_use]
    pub fn render(self, mode: OutputMode) -> InterpretationOutput {
        match mode {
            OutputMode::Summary => InterpretationOutput::Summary(self.summary()),
            OutputMode::Detailed => InterpretationOutput::Detailed(DetailedReport {
                log: self.explain_log,
                audit: self.audit,
            }),
            OutputMode::Json => {
                let mut ranked = self.ranked.into_iter();
                let top_interpretation = ranked.next();
                InterpretationOutput::Json(AnalysisReport {
                    ambiguity_score: self.ambiguity_score,
                    confidence_score: self.confidence,
                    phases_applied: self.phases_applied,
                    override_event: self.override_event,
                    top_interpretation,
                    alternatives: ranked.collect(),
                    safety_audit: self.audit,
                })
            }
        }
    }
}

/// Scores, orchestrates and renders one evaluation.
#[must_use]
pub fn interpret(
    library: &CanonLibrary,
    config: &EngineConfig,
    claim: &str,
    rule_text: &str,
    mode: OutputMode,
) -> InterpretationOutput {
    PhaseOrchestrator::new(library, config)
        .run(claim, rule_text)
        .render(mode)
}
