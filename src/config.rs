//! Mapper configuration
//!
//! Loaded from YAML:
//!
//! ```yaml
//! uri_prefix: "cellini:"
//! predicate_policy: strict
//! max_depth: 16
//! ```
//!
//! Every key is optional; missing keys take their defaults.

use crate::odm::{PredicatePolicy, DEFAULT_MAX_DEPTH, DEFAULT_URI_PREFIX};
use oxiri::Iri;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use uuid::Uuid;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Settings shared by the registry, resolver and mapper
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OdmConfig {
    /// Prefix of every instance URI
    pub uri_prefix: String,
    /// Handling of predicates no field maps to
    pub predicate_policy: PredicatePolicy,
    /// Limit on nested reference depth during resolution
    pub max_depth: usize,
}

impl Default for OdmConfig {
    fn default() -> Self {
        Self {
            uri_prefix: DEFAULT_URI_PREFIX.to_string(),
            predicate_policy: PredicatePolicy::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl OdmConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> ConfigResult<Self> {
        let config: OdmConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&content)
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        if self.uri_prefix.is_empty() {
            return Err(ConfigError::Invalid("uri_prefix is empty".to_string()));
        }

        // A prefix is only usable if the URIs built from it are IRIs
        let sample = format!("{}Title:{}", self.uri_prefix, Uuid::nil());
        if let Err(e) = Iri::parse(sample.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "uri_prefix {:?} does not form IRIs: {}",
                self.uri_prefix, e
            )));
        }

        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be positive".to_string()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = OdmConfig::default();
        assert_eq!(config.uri_prefix, "cellini:");
        assert_eq!(config.predicate_policy, PredicatePolicy::Lenient);
        assert_eq!(config.max_depth, 32);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml() {
        let config = OdmConfig::from_yaml_str("predicate_policy: strict\n").unwrap();
        assert_eq!(config.predicate_policy, PredicatePolicy::Strict);
        assert_eq!(config.uri_prefix, "cellini:");

        let config = OdmConfig::from_yaml_str("uri_prefix: \"urn:app:\"\nmax_depth: 4\n").unwrap();
        assert_eq!(config.uri_prefix, "urn:app:");
        assert_eq!(config.max_depth, 4);
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            OdmConfig::from_yaml_str("uri_prefix: \"\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            OdmConfig::from_yaml_str("uri_prefix: \"not a scheme\"\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            OdmConfig::from_yaml_str("max_depth: 0\n"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            OdmConfig::from_yaml_str("predicate_policy: loose\n"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "uri_prefix: \"urn:test:\"").unwrap();
        writeln!(file, "predicate_policy: lenient").unwrap();

        let config = OdmConfig::from_file(file.path()).unwrap();
        assert_eq!(config.uri_prefix, "urn:test:");
        assert_eq!(config.max_depth, 32);

        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            OdmConfig::from_file(dir.path().join("missing.yaml")),
            Err(ConfigError::Io(_))
        ));
    }
}
