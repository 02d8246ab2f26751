//! Configuration for the sdkify migration tool
//!
//! Settings live in a TOML file (`sdkify.toml`). The file is located, in order:
//! 1. an explicit path (the `--config` flag)
//! 2. the `SDKIFY_CONFIG` environment variable
//! 3. the platform config directory (`~/.config/sdkify/sdkify.toml`)
//!
//! A missing file at locations 2 or 3 is not an error; defaults apply.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "SDKIFY_CONFIG";

const CONFIG_FILE_NAME: &str = "sdkify.toml";

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// A package pinned into every migrated test project
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct TestPackage {
    pub id: String,
    pub version: String,
}

impl TestPackage {
    pub fn new(id: &str, version: &str) -> Self {
        Self {
            id: id.to_string(),
            version: version.to_string(),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// Moniker used when the legacy project declares no usable framework version
    pub default_target_framework: String,
    /// Upper bound on the size of any input file read during migration
    pub max_input_bytes: u64,
    /// Name of the dependency-lock file expected beside each project
    pub lock_file_name: String,
    /// Test SDK, adapter and framework appended to test projects, in that order
    pub test_packages: Vec<TestPackage>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_target_framework: "net472".to_string(),
            max_input_bytes: 16 * 1024 * 1024,
            lock_file_name: "packages.config".to_string(),
            test_packages: vec![
                TestPackage::new("Microsoft.NET.Test.Sdk", "17.8.0"),
                TestPackage::new("MSTest.TestAdapter", "3.1.1"),
                TestPackage::new("MSTest.TestFramework", "3.1.1"),
            ],
        }
    }
}

impl Config {
    /// Default config file path (platform-appropriate)
    pub fn default_path() -> Option<PathBuf> {
        #[cfg(not(target_os = "windows"))]
        let dir = dirs::home_dir().map(|home| home.join(".config").join("sdkify"));

        #[cfg(target_os = "windows")]
        let dir = dirs::config_dir().map(|config| config.join("sdkify"));

        dir.map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Load configuration, honoring an explicit path before the environment
    /// override and the default location.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            return Self::load_from_path(path);
        }

        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                let path = PathBuf::from(trimmed);
                if path.exists() {
                    return Self::load_from_path(&path);
                }
                return Ok(Self::default());
            }
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Read and validate a config file from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_target_framework.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "default_target_framework must not be empty".to_string(),
            ));
        }
        if self.max_input_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_input_bytes must be greater than zero".to_string(),
            ));
        }
        if self.lock_file_name.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "lock_file_name must not be empty".to_string(),
            ));
        }
        if let Some(bad) = self
            .test_packages
            .iter()
            .find(|p| p.id.trim().is_empty() || p.version.trim().is_empty())
        {
            return Err(ConfigError::Invalid(format!(
                "test package entry needs both id and version (got id '{}')",
                bad.id
            )));
        }
        Ok(())
    }
}
