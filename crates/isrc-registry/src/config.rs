//! # Registry Configuration
//!
//! Deployment-wide settings: the territory and registrant groups stamped on
//! every code, the salt mixed into owner keys before hashing, the number of
//! range buckets, and the key under which registry state is persisted.
//!
//! Loaded from YAML; every field is optional and falls back to its default.
//!
//! ```yaml
//! territory: ZA
//! registrant: 80G
//! salt: isrc-registry-salt
//! buckets: 90
//! store_key: isrc-registry
//! ```

use std::path::Path;

use isrc_core::isrc::{validate_registrant, validate_territory};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::range::MAX_BUCKETS;

/// Settings shared by every registry in a deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Two-letter territory group.
    pub territory: String,
    /// Three-character registrant group.
    pub registrant: String,
    /// Salt appended to owner keys before hashing.
    pub salt: String,
    /// Number of designation range buckets, `1..=99`.
    pub buckets: u32,
    /// Persistence key for the registry document.
    pub store_key: String,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            territory: "ZA".to_string(),
            registrant: "80G".to_string(),
            salt: "isrc-registry-salt".to_string(),
            buckets: 90,
            store_key: "isrc-registry".to_string(),
        }
    }
}

impl RegistryConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Check every field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a malformed territory or
    /// registrant, a bucket count outside `1..=99`, or an empty store key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_territory(&self.territory).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        validate_registrant(&self.registrant).map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.buckets == 0 || self.buckets > MAX_BUCKETS {
            return Err(ConfigError::Invalid(format!(
                "buckets must be in 1..={MAX_BUCKETS}, got {}",
                self.buckets
            )));
        }
        if self.store_key.trim().is_empty() {
            return Err(ConfigError::Invalid("store_key must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        RegistryConfig::default().validate().unwrap();
    }

    #[test]
    fn test_partial_yaml_takes_defaults() {
        let config = RegistryConfig::from_yaml_str("territory: US\nregistrant: RC1\n").unwrap();
        assert_eq!(config.territory, "US");
        assert_eq!(config.registrant, "RC1");
        assert_eq!(config.buckets, 90);
        assert_eq!(config.store_key, "isrc-registry");
    }

    #[test]
    fn test_rejects_bad_territory() {
        let err = RegistryConfig::from_yaml_str("territory: ZAF\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_bad_registrant() {
        let err = RegistryConfig::from_yaml_str("registrant: 8-G\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_buckets_beyond_designation_field() {
        assert!(RegistryConfig::from_yaml_str("buckets: 99\n").is_ok());
        assert!(RegistryConfig::from_yaml_str("buckets: 100\n").is_err());
        assert!(RegistryConfig::from_yaml_str("buckets: 900\n").is_err());
        assert!(RegistryConfig::from_yaml_str("buckets: 0\n").is_err());
    }

    #[test]
    fn test_rejects_unknown_field() {
        let err = RegistryConfig::from_yaml_str("territroy: ZA\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_from_missing_file() {
        let err = RegistryConfig::from_yaml_file(Path::new("/nonexistent/isrc.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
