use anyhow::{Context, Result};
use serde_json::{json, Value};
use shared_logging::LogLevel;
use uuid::Uuid;

use crate::{
    config::EngineConfig,
    pipeline::PhaseOrchestrator,
    report::{InterpretationOutput, OutputMode},
    store::{CanonLibrary, SharedCanonStore},
    telemetry::InterpreterTelemetry,
};

/// Long-lived entry point: a shared rule set, engine settings and telemetry.
///
/// Each call snapshots the rule set and builds its own ledger, so concurrent
/// calls never share run state.
#[derive(Debug)]
pub struct InterpretationRuntime {
    store: SharedCanonStore,
    config: EngineConfig,
    telemetry: Option<InterpreterTelemetry>,
}

impl InterpretationRuntime {
    /// Creates a runtime over an existing store.
    pub fn new(
        store: SharedCanonStore,
        config: EngineConfig,
        telemetry: Option<InterpreterTelemetry>,
    ) -> Result<Self> {
        config.validate().context("validating engine configuration")?;
        Ok(Self {
            store,
            config,
            telemetry,
        })
    }

    /// Runtime over the bundled reference rule set and reference settings.
    pub fn with_reference_canons(telemetry: Option<InterpreterTelemetry>) -> Result<Self> {
        let library = CanonLibrary::reference().context("loading reference canons")?;
        Self::new(
            SharedCanonStore::new(library),
            EngineConfig::default(),
            telemetry,
        )
    }

    /// Engine settings in use.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Underlying rule store.
    #[must_use]
    pub const fn store(&self) -> &SharedCanonStore {
        &self.store
    }

    /// Evaluates a claim against a rule text and renders the result.
    ///
    /// Infallible: every configuration error surfaces when the rule set or
    /// settings are loaded, never mid-run.
    #[must_use]
    pub fn interpret(
        &self,
        claim: &str,
        rule_text: &str,
        mode: OutputMode,
    ) -> InterpretationOutput {
        let run_id = Uuid::new_v4();
        let library = self.store.snapshot();
        self.log(
            LogLevel::Info,
            "canon.interpret.started",
            json!({
                "run_id": run_id,
                "mode": mode.as_str(),
                "claim_chars": claim.chars().count(),
                "rule_chars": rule_text.chars().count(),
                "canons": library.canon_count(),
            }),
        );
        let outcome = PhaseOrchestrator::new(&library, &self.config).run(claim, rule_text);
        self.log(
            LogLevel::Info,
            "canon.interpret.completed",
            json!({
                "run_id": run_id,
                "ambiguity_score": outcome.ambiguity_score,
                "confidence_score": outcome.confidence,
                "phases_applied": outcome.phases_applied,
                "override_event": outcome.override_event,
                "interpretations": outcome.ranked.len(),
                "audit_status": outcome.audit.status,
            }),
        );
        if outcome.audit.impact_detected {
            self.log(
                LogLevel::Warn,
                "canon.audit.instability",
                json!({
                    "run_id": run_id,
                    "tested_canon": outcome.audit.tested_canon,
                    "hypothetical_score": outcome.audit.hypothetical_score,
                }),
            );
        }
        outcome.render(mode)
    }

    /// Re-reads the backing rule file. On failure the previous rule set stays
    /// active and the error is returned.
    pub fn reload(&self) -> Result<bool> {
        match self.store.reload() {
            Ok(reloaded) => {
                self.log(
                    LogLevel::Info,
                    "canon.store.reloaded",
                    json!({
                        "reloaded": reloaded,
                        "canons": self.store.snapshot().canon_count(),
                    }),
                );
                Ok(reloaded)
            }
            Err(err) => {
                self.log(
                    LogLevel::Error,
                    "canon.store.reload_failed",
                    json!({ "error": err.to_string() }),
                );
                Err(err).context("reloading canon store")
            }
        }
    }

    fn log(&self, level: LogLevel, message: &str, metadata: Value) {
        if let Some(tel) = &self.telemetry {
            let _ = tel.log(level, message, metadata);
        }
    }
}
