#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rust_2018_idioms,
    missing_docs
)]

//! Phased canon evaluation: weighted interpretive rules are applied phase by
//! phase to a claim and a rule text, producing ranked interpretations, a
//! confidence score and a post-run stability audit.

/// Advisory ambiguity scoring and text normalisation.
pub mod ambiguity;
/// Post-run stress test against unused canons.
pub mod audit;
/// Canon, trigger and phase definitions.
pub mod canon;
/// Running confidence.
pub mod confidence;
/// Engine tunables.
pub mod config;
/// Configuration errors.
pub mod error;
/// Interpretation ledger.
pub mod ledger;
/// Lookahead safeguard and per-phase decisions.
pub mod lookahead;
pub mod pipeline;
/// Output shapes and rendering.
pub mod report;
/// Long-lived runtime with telemetry and hot reload.
pub mod runtime;
/// Rule set loading and sharing.
pub mod store;
/// Telemetry builder/handle.
pub mod telemetry;
pub mod trigger;

pub use audit::{AuditResult, AuditStatus};
pub use canon::{Canon, PhaseId, Trigger};
pub use config::EngineConfig;
pub use error::CanonError;
pub use ledger::{Interpretation, InterpretationLedger};
pub use lookahead::PhaseDecision;
pub use pipeline::{PhaseOrchestrator, PhaseSnapshot, RunOutcome};
pub use report::{interpret, AnalysisReport, DetailedReport, InterpretationOutput, OutputMode};
pub use runtime::InterpretationRuntime;
pub use store::{CanonLibrary, SharedCanonStore};
pub use telemetry::{InterpreterTelemetry, InterpreterTelemetryBuilder};
