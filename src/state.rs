//! Persistent state of the local simulated provider

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reconcile::Environment;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths;

pub const FILE_NAME: &str = "environments.toml";

/// Every environment the local provider knows about, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub environments: BTreeMap<String, LocalEnvironment>,

    /// Last time the state was written
    #[serde(default)]
    pub last_updated: Option<DateTime<Utc>>,
}

/// One environment plus its pending transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalEnvironment {
    /// Status reads left before `settles_to` applies
    #[serde(default)]
    pub pending_reads: u32,

    /// Status the environment moves to once settled; `DELETED` removes it
    #[serde(default)]
    pub settles_to: Option<String>,

    pub environment: Environment,
}

impl LocalEnvironment {
    /// Start a transition to `target` through `status`
    pub fn begin(&mut self, status: &str, target: &str, reads: u32) {
        self.environment.status = status.to_string();
        self.settles_to = Some(target.to_string());
        self.pending_reads = reads;
    }

    /// Count one status read, settling when none are left
    pub fn observe(&mut self) {
        if self.settles_to.is_none() {
            return;
        }

        self.pending_reads = self.pending_reads.saturating_sub(1);
        if self.pending_reads == 0
            && let Some(target) = self.settles_to.take()
        {
            log::debug!(
                "Local environment {} settled: {} -> {target}",
                self.environment.name,
                self.environment.status
            );
            self.environment.status = target;
        }
    }
}

impl LocalState {
    /// Path of the state file
    pub fn path() -> Result<PathBuf> {
        Ok(paths::state_dir()?.join(FILE_NAME))
    }

    /// Load from `path`, or return empty state if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using empty state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save to `path`, stamping `last_updated`
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Some(Utc::now());
        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Find an environment by ARN
    pub fn find_by_arn_mut(&mut self, arn: &str) -> Option<&mut LocalEnvironment> {
        self.environments
            .values_mut()
            .find(|e| e.environment.arn == arn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn local(name: &str) -> LocalEnvironment {
        LocalEnvironment {
            pending_reads: 0,
            settles_to: None,
            environment: Environment {
                name: name.to_string(),
                arn: format!("arn:local:{name}"),
                status: "AVAILABLE".to_string(),
                ..Environment::default()
            },
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let state = LocalState::load_from(&dir.path().join(FILE_NAME)).unwrap();
        assert!(state.environments.is_empty());
        assert!(state.last_updated.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("state").join(FILE_NAME);

        let mut env = local("analytics");
        env.environment.max_workers = Some(4);
        env.environment
            .tags
            .insert("team".to_string(), Some("data".to_string()));
        env.begin("UPDATING", "AVAILABLE", 2);

        let mut state = LocalState::default();
        state.environments.insert("analytics".to_string(), env);
        state.save_to(&path).unwrap();

        let loaded = LocalState::load_from(&path).unwrap();
        let env = &loaded.environments["analytics"];
        assert_eq!(env.environment.status, "UPDATING");
        assert_eq!(env.environment.max_workers, Some(4));
        assert_eq!(env.environment.tags.get("team"), Some(&Some("data".to_string())));
        assert_eq!(env.pending_reads, 2);
        assert!(loaded.last_updated.is_some());
    }

    #[test]
    fn test_observe_settles_after_reads() {
        let mut env = local("e");
        env.begin("CREATING", "AVAILABLE", 2);

        env.observe();
        assert_eq!(env.environment.status, "CREATING");
        env.observe();
        assert_eq!(env.environment.status, "AVAILABLE");
        assert!(env.settles_to.is_none());

        env.observe();
        assert_eq!(env.environment.status, "AVAILABLE");
    }

    #[test]
    fn test_find_by_arn() {
        let mut state = LocalState::default();
        state.environments.insert("a".to_string(), local("a"));
        assert!(state.find_by_arn_mut("arn:local:a").is_some());
        assert!(state.find_by_arn_mut("arn:local:b").is_none());
    }
}
