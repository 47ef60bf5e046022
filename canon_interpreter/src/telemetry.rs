use std::{fmt, path::PathBuf, sync::Arc};

use anyhow::Result;
use serde_json::Value;
use shared_logging::{JsonLogger, LogLevel, LogRecord};

/// Builder for interpreter telemetry sinks.
pub struct InterpreterTelemetryBuilder {
    module: String,
    log_path: Option<PathBuf>,
    min_level: LogLevel,
}

impl InterpreterTelemetryBuilder {
    /// Creates the builder.
    #[must_use]
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            log_path: None,
            min_level: LogLevel::Debug,
        }
    }

    /// Sets the JSON-lines log path.
    #[must_use]
    pub fn log_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.log_path = Some(path.into());
        self
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Opens the sink.
    pub fn build(self) -> Result<InterpreterTelemetry> {
        let logger = match self.log_path {
            Some(path) => Some(JsonLogger::new(path)?.with_min_level(self.min_level)),
            None => None,
        };
        Ok(InterpreterTelemetry {
            inner: Arc::new(TelemetryInner {
                module: self.module,
                logger,
            }),
        })
    }
}

/// Cloneable telemetry handle.
#[derive(Clone)]
pub struct InterpreterTelemetry {
    inner: Arc<TelemetryInner>,
}

impl fmt::Debug for InterpreterTelemetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InterpreterTelemetry")
            .field("module", &self.inner.module)
            .field("log_path", &self.inner.logger.as_ref().map(JsonLogger::path))
            .finish()
    }
}

struct TelemetryInner {
    module: String,
    logger: Option<JsonLogger>,
}

impl InterpreterTelemetry {
    /// Returns a builder.
    #[must_use]
    pub fn builder(module: impl Into<String>) -> InterpreterTelemetryBuilder {
        InterpreterTelemetryBuilder::new(module)
    }

    /// Logs structured metadata. A no-op when no log path was configured.
    pub fn log(&self, level: LogLevel, message: &str, metadata: Value) -> Result<()> {
        if let Some(logger) = &self.inner.logger {
            let record = LogRecord::new(&self.inner.module, level, message).with_metadata(metadata);
            logger.log(&record)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn telemetry_writes_log_lines() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("interpreter.log");
        let telemetry = InterpreterTelemetry::builder("canon")
            .log_path(&path)
            .build()
            .unwrap();
        telemetry
            .log(LogLevel::Info, "canon.interpret.started", json!({ "mode": "json" }))
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("canon.interpret.started"));
        assert!(content.contains("\"mode\":\"json\""));
    }

    #[test]
    fn telemetry_without_sink_is_silent() {
        let telemetry = InterpreterTelemetry::builder("canon").build().unwrap();
        telemetry
            .log(LogLevel::Error, "canon.interpret.failed", json!({}))
            .unwrap();
        assert!(format!("{telemetry:?}").contains("canon"));
    }
}
