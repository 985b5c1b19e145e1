//! Lifecycle status reported by the provider

use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Discrete lifecycle states of an environment
///
/// Parsing is case-insensitive and never fails: values this crate does not
/// know are kept in [`LifecycleStatus::Other`] and treated as pending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifecycleStatus {
    Creating,
    CreateFailed,
    Available,
    Updating,
    UpdateFailed,
    Deleting,
    Deleted,
    Unavailable,
    Other(String),
}

impl LifecycleStatus {
    /// Provider spelling of this status
    pub fn as_str(&self) -> &str {
        match self {
            Self::Creating => "CREATING",
            Self::CreateFailed => "CREATE_FAILED",
            Self::Available => "AVAILABLE",
            Self::Updating => "UPDATING",
            Self::UpdateFailed => "UPDATE_FAILED",
            Self::Deleting => "DELETING",
            Self::Deleted => "DELETED",
            Self::Unavailable => "UNAVAILABLE",
            Self::Other(raw) => raw,
        }
    }

    /// Whether the environment is still moving between states
    pub fn is_pending(&self) -> bool {
        !self.is_failure() && !matches!(self, Self::Available | Self::Deleted)
    }

    /// Whether this status ends a create or update unsuccessfully
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::CreateFailed | Self::UpdateFailed | Self::Unavailable
        )
    }
}

impl From<&str> for LifecycleStatus {
    fn from(s: &str) -> Self {
        let upper = s.trim().to_ascii_uppercase();
        match upper.as_str() {
            "CREATING" => Self::Creating,
            "CREATE_FAILED" => Self::CreateFailed,
            "AVAILABLE" => Self::Available,
            "UPDATING" => Self::Updating,
            "UPDATE_FAILED" => Self::UpdateFailed,
            "DELETING" => Self::Deleting,
            "DELETED" => Self::Deleted,
            "UNAVAILABLE" => Self::Unavailable,
            _ => Self::Other(upper),
        }
    }
}

impl FromStr for LifecycleStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for LifecycleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
