//! Configuration file (`config.toml` in the config directory)

use anyhow::{Context, Result, bail};
use reconcile::{ApiErrorKind, HandlerOptions, RetryPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::paths;

pub const FILE_NAME: &str = "config.toml";

/// All mwaa-env settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub handler: HandlerConfig,
    pub retry: RetryConfig,
    pub local: LocalConfig,
}

/// Settings shared by every operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlerConfig {
    /// Delay requested from the scheduler while an operation is in flight
    pub callback_delay_seconds: u32,
    /// Tag keys with this prefix belong to the provider and are never reconciled
    pub reserved_tag_prefix: String,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            callback_delay_seconds: 60,
            reserved_tag_prefix: reconcile::RESERVED_TAG_PREFIX.to_string(),
        }
    }
}

/// Retry settings for the create call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts, including the first
    pub max_attempts: u32,
    /// First backoff delay; doubles after every further failure
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 14,
            base_delay_ms: 2,
        }
    }
}

/// Settings for the local simulated provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocalConfig {
    /// Status reads before a transitional status settles
    pub settle_polls: u32,
}

impl Default for LocalConfig {
    fn default() -> Self {
        Self { settle_polls: 2 }
    }
}

impl Config {
    /// Path of the config file
    pub fn path() -> Result<PathBuf> {
        Ok(paths::config_dir()?.join(FILE_NAME))
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, falling back to defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid TOML in config file: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        log::debug!("Saved config to {}", path.display());
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            bail!("retry.max_attempts must be at least 1");
        }
        if self.retry.base_delay_ms == 0 {
            bail!("retry.base_delay_ms must be greater than 0");
        }
        if self.handler.reserved_tag_prefix.is_empty() {
            bail!("handler.reserved_tag_prefix cannot be empty");
        }
        Ok(())
    }

    /// Options handed to every handler invocation
    pub fn handler_options(&self) -> HandlerOptions {
        HandlerOptions {
            callback_delay_seconds: self.handler.callback_delay_seconds,
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                base_delay: Duration::from_millis(self.retry.base_delay_ms),
                retryable: ApiErrorKind::TRANSIENT.to_vec(),
            },
            reserved_tag_prefix: self.handler.reserved_tag_prefix.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join(FILE_NAME)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.handler_options(), HandlerOptions::default());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "[local]\nsettle_polls = 5\n\n[retry]\nmax_attempts = 3\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.local.settle_polls, 5);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(config.retry.base_delay_ms, 2);
        assert_eq!(config.handler.callback_delay_seconds, 60);

        let options = config.handler_options();
        assert_eq!(options.retry.max_attempts, 3);
        assert_eq!(options.retry.base_delay, Duration::from_millis(2));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.retry.max_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.retry.base_delay_ms = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.handler.reserved_tag_prefix.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(FILE_NAME);
        fs::write(&path, "[retry]\nmax_attempts = 0\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("max_attempts"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join(FILE_NAME);

        let mut config = Config::default();
        config.handler.callback_delay_seconds = 5;
        config.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), config);
    }
}
