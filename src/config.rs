//! Evaluation configuration
//!
//! Loaded from JSON; every field has a default so `{}` is a valid config.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability::{Logger, Severity};

/// How an intersection picks the include that proposes candidates.
///
/// Output is identical under every choice; only the amount of skipping differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverSelection {
    /// First enumerable include in construction order
    #[default]
    First,
    /// Include whose source reports the fewest remaining keys
    SmallestHint,
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration text is not valid JSON for this schema
    #[error("Invalid evaluation config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Evaluation configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Driving include selection (default: first)
    #[serde(default)]
    pub driver: DriverSelection,

    /// Lowest severity written by the tree logger (default: WARN)
    #[serde(default = "default_log_level")]
    pub log_level: Severity,
}

fn default_log_level() -> Severity {
    Severity::Warn
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            driver: DriverSelection::default(),
            log_level: default_log_level(),
        }
    }
}

impl EvaluationConfig {
    /// Parse a config from JSON text
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Create a config with the given driver selection
    pub fn with_driver(driver: DriverSelection) -> Self {
        Self {
            driver,
            ..Self::default()
        }
    }

    /// Logger honoring the configured level
    pub fn logger(&self) -> Logger {
        Logger::new(self.log_level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EvaluationConfig::default();
        assert_eq!(config.driver, DriverSelection::First);
        assert_eq!(config.log_level, Severity::Warn);
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = EvaluationConfig::from_json("{}").unwrap();
        assert_eq!(config, EvaluationConfig::default());
    }

    #[test]
    fn test_parse_fields() {
        let config =
            EvaluationConfig::from_json(r#"{"driver":"smallest_hint","log_level":"TRACE"}"#)
                .unwrap();
        assert_eq!(config.driver, DriverSelection::SmallestHint);
        assert_eq!(config.logger().threshold(), Severity::Trace);
    }

    #[test]
    fn test_parse_error() {
        let err = EvaluationConfig::from_json(r#"{"driver":"largest"}"#).unwrap_err();
        assert!(err.to_string().starts_with("Invalid evaluation config"));
    }
}
