#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    missing_docs,
    rust_2018_idioms
)]

//! JSON-lines logging shared by the interpreter library and its CLI.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    str::FromStr,
};

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Severity attached to a record. Ordered from least to most severe.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Verbose diagnostics.
    Debug,
    /// Normal lifecycle events.
    Info,
    /// Recoverable anomalies.
    Warn,
    /// Failed operations.
    Error,
}

impl FromStr for LogLevel {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" | "warning" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(anyhow!("unknown log level `{other}`")),
        }
    }
}

/// One line of the log file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// Emission time (UTC, RFC 3339 when serialized).
    pub timestamp: DateTime<Utc>,
    /// Component that produced the record.
    pub module: String,
    /// Severity.
    pub level: LogLevel,
    /// Short dotted event name, e.g. `canon.interpret.completed`.
    pub message: String,
    /// Structured fields.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub metadata: Map<String, Value>,
}

impl LogRecord {
    /// Creates a record stamped with the current time.
    #[must_use]
    pub fn new(module: impl Into<String>, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            module: module.into(),
            level,
            message: message.into(),
            metadata: Map::new(),
        }
    }

    /// Adds a single structured field.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Merges the fields of a JSON object. Non-object values are ignored.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        if let Value::Object(fields) = metadata {
            self.metadata.extend(fields);
        }
        self
    }
}

/// Append-only JSON-lines logger, safe to share between threads.
#[derive(Debug)]
pub struct JsonLogger {
    path: PathBuf,
    min_level: LogLevel,
    writer: Mutex<File>,
}

impl JsonLogger {
    /// Opens (or creates) the log file, creating parent directories as needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating log directory {}", parent.display()))?;
            }
        }
        let file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log file {}", path.display()))?;
        Ok(Self {
            path,
            min_level: LogLevel::Debug,
            writer: Mutex::new(file),
        })
    }

    /// Drops records below `level`.
    #[must_use]
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Writes one record followed by a newline.
    pub fn log(&self, record: &LogRecord) -> Result<()> {
        if record.level < self.min_level {
            return Ok(());
        }
        let mut writer = self.writer.lock();
        serde_json::to_writer(&mut *writer, record)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }

    /// Path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn appends_one_json_object_per_line() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("nested/interp.log")).unwrap();
        logger
            .log(&LogRecord::new("canon", LogLevel::Info, "first").with_field("phase", "phase_0"))
            .unwrap();
        logger
            .log(
                &LogRecord::new("canon", LogLevel::Warn, "second")
                    .with_metadata(json!({ "confidence": 0.5 })),
            )
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        let second: LogRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.level, LogLevel::Warn);
        assert_eq!(second.metadata["confidence"], json!(0.5));
        assert!(lines[0].contains("\"phase\":\"phase_0\""));
    }

    #[test]
    fn parses_level_names() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
    }

    #[test]
    fn records_below_min_level_are_skipped() {
        let dir = tempdir().unwrap();
        let logger = JsonLogger::new(dir.path().join("quiet.log"))
            .unwrap()
            .with_min_level(LogLevel::Warn);
        logger
            .log(&LogRecord::new("canon", LogLevel::Debug, "noise"))
            .unwrap();
        logger
            .log(&LogRecord::new("canon", LogLevel::Error, "kept"))
            .unwrap();
        let content = fs::read_to_string(logger.path()).unwrap();
        assert!(!content.contains("noise"));
        assert!(content.contains("kept"));
    }
}
