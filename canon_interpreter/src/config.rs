use std::{fs, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::CanonError;

/// Tunables for one evaluation engine. Missing keys take reference values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Confidence at which the pipeline may stop early.
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f64,
    /// Minimum next-phase canon weight that forces escalation.
    #[serde(default = "default_lookahead_margin")]
    pub lookahead_margin: f64,
    /// Hypothetical score gain that the safety audit treats as unstable.
    #[serde(default = "default_safety_margin_threshold")]
    pub safety_margin_threshold: f64,
    /// Normaliser for score gaps; the largest plausible cumulative score.
    #[serde(default = "default_total_score_cap")]
    pub total_score_cap: f64,
    /// Confidence before any phase has run.
    #[serde(default = "default_baseline_confidence")]
    pub baseline_confidence: f64,
}

impl EngineConfig {
    /// Loads a TOML file and validates it.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CanonError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|err| CanonError::io(path, err))?;
        Self::from_toml_str(&raw)
    }

    /// Parses TOML text and validates it.
    pub fn from_toml_str(raw: &str) -> Result<Self, CanonError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the pipeline cannot work with.
    pub fn validate(&self) -> Result<(), CanonError> {
        if !self.total_score_cap.is_finite() || self.total_score_cap <= 0.0 {
            return Err(CanonError::InvalidConfig(format!(
                "total_score_cap must be positive, got {}",
                self.total_score_cap
            )));
        }
        for (name, value) in [
            ("confidence_threshold", self.confidence_threshold),
            ("baseline_confidence", self.baseline_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(CanonError::InvalidConfig(format!(
                    "{name} must lie in [0, 1], got {value}"
                )));
            }
        }
        for (name, value) in [
            ("lookahead_margin", self.lookahead_margin),
            ("safety_margin_threshold", self.safety_margin_threshold),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CanonError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_confidence_threshold(),
            lookahead_margin: default_lookahead_margin(),
            safety_margin_threshold: default_safety_margin_threshold(),
            total_score_cap: default_total_score_cap(),
            baseline_confidence: default_baseline_confidence(),
        }
    }
}

const fn default_confidence_threshold() -> f64 {
    0.9
}

const fn default_lookahead_margin() -> f64 {
    10.0
}

const fn default_safety_margin_threshold() -> f64 {
    20.0
}

const fn default_total_score_cap() -> f64 {
    500.0
}

const fn default_baseline_confidence() -> f64 {
    0.2
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn partial_toml_keeps_reference_values() {
        let config = EngineConfig::from_toml_str("total_score_cap = 250.0\n").unwrap();
        assert_eq!(config.total_score_cap, 250.0);
        assert_eq!(config.confidence_threshold, 0.9);
        assert_eq!(config.lookahead_margin, 10.0);
        assert_eq!(config.safety_margin_threshold, 20.0);
        assert_eq!(config.baseline_confidence, 0.2);
    }

    #[test]
    fn empty_toml_is_reference_configuration() {
        assert_eq!(
            EngineConfig::from_toml_str("").unwrap(),
            EngineConfig::default()
        );
    }

    #[test]
    fn rejects_non_positive_cap() {
        let err = EngineConfig::from_toml_str("total_score_cap = 0.0").unwrap_err();
        assert!(matches!(err, CanonError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_threshold_outside_unit_interval() {
        let err = EngineConfig::from_toml_str("confidence_threshold = 1.5").unwrap_err();
        assert!(err.to_string().contains("confidence_threshold"));
    }

    #[test]
    fn rejects_bad_toml() {
        let err = EngineConfig::from_toml_str("lookahead_margin = \"wide\"").unwrap_err();
        assert!(matches!(err, CanonError::ConfigParse(_)));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("engine.toml");
        fs::write(&path, "lookahead_margin = 25.0\nbaseline_confidence = 0.3\n").unwrap();
        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.lookahead_margin, 25.0);
        assert_eq!(config.baseline_confidence, 0.3);

        let missing = EngineConfig::load(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(missing, CanonError::Io { .. }));
    }
}
