//! # CLI Configuration
//!
//! The optional `--config` YAML file: the registry settings plus where the
//! registry document is kept.
//!
//! ```yaml
//! registry:
//!   territory: ZA
//!   registrant: 80G
//!   salt: my-deployment-salt
//! store_dir: /var/lib/isrc
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use isrc_registry::RegistryConfig;
use serde::{Deserialize, Serialize};

/// Directory used when neither `--store-dir` nor `store_dir` is given.
pub const DEFAULT_STORE_DIR: &str = ".isrc";

/// Contents of the `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CliConfig {
    /// Registry settings.
    pub registry: RegistryConfig,
    /// Directory holding the registry JSON document.
    pub store_dir: Option<PathBuf>,
}

impl CliConfig {
    /// Parse and validate a YAML document.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml).context("invalid configuration YAML")?;
        config.registry.validate().context("invalid registry configuration")?;
        Ok(config)
    }

    /// Load `path`, or the defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_yaml_str(&yaml)?;
        tracing::debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }
}

/// Settings shared by every subcommand, resolved from global flags.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Loaded configuration.
    pub config: CliConfig,
    /// Effective registry document directory.
    pub store_dir: PathBuf,
    /// Requester identity for range allocation.
    pub owner_key: Option<String>,
}

impl Settings {
    /// Combine the config file with command-line overrides.
    /// `--store-dir` wins over the file, which wins over [`DEFAULT_STORE_DIR`].
    pub fn resolve(config: Option<&Path>, store_dir: Option<&Path>, owner_key: Option<&str>) -> Result<Self> {
        let config = CliConfig::load(config)?;
        let store_dir = store_dir
            .map(Path::to_path_buf)
            .or_else(|| config.store_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));
        Ok(Self {
            config,
            store_dir,
            owner_key: owner_key.map(str::to_string),
        })
    }
}
