//! Run configuration, loadable from JSON.
//!
//! ```json
//! {
//!   "pairing": {
//!     "tolerance": { "relative": 0.02 },
//!     "min_match_count": 4,
//!     "allow_cross_library": true
//!   },
//!   "assembly": { "offset_slack": 2000 }
//! }
//! ```
//!
//! Every field is optional and falls back to its default.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assembly::assembler::AssemblyConfig;
use crate::matching::matcher::Tolerance;
use crate::matching::pairs::PairConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a full mapping run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    pub pairing: PairConfig,
    pub assembly: AssemblyConfig,
}

impl MappingConfig {
    /// Load a configuration from a JSON file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ReadError` if the file cannot be read, or
    /// `ConfigError::ParseError`/`ConfigError::Invalid` if its content is not
    /// a valid configuration.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse a configuration from JSON text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ParseError` for malformed JSON or
    /// `ConfigError::Invalid` for out-of-range values.
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fraction = self.pairing.min_match_fraction;
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ConfigError::Invalid(format!(
                "min_match_fraction must be within 0..=1, got {fraction}"
            )));
        }
        if let Tolerance::Relative(f) = self.pairing.tolerance {
            if !(0.0..1.0).contains(&f) {
                return Err(ConfigError::Invalid(format!(
                    "relative tolerance must be within 0..1, got {f}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = MappingConfig::from_json(
            r#"{"pairing": {"tolerance": {"relative": 0.02}, "min_match_count": 4}}"#,
        )
        .unwrap();
        assert_eq!(config.pairing.tolerance, Tolerance::Relative(0.02));
        assert_eq!(config.pairing.min_match_count, 4);
        assert!(!config.pairing.allow_cross_library);
        assert_eq!(config.assembly, AssemblyConfig::default());
    }

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(
            MappingConfig::from_json("{}").unwrap(),
            MappingConfig::default()
        );
    }

    #[test]
    fn test_out_of_range_values_are_rejected() {
        let err =
            MappingConfig::from_json(r#"{"pairing": {"min_match_fraction": 1.5}}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = MappingConfig::from_json(r#"{"pairing": {"tolerance": {"relative": 2.0}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            MappingConfig::from_json("{not json"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
