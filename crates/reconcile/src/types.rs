//! Resource model for a managed workflow environment

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Resource type name used in user-facing messages
pub const TYPE_NAME: &str = "AWS::MWAA::Environment";

/// A tag set: unique keys, values may be absent
///
/// Ordered so that logs and comparisons are deterministic.
pub type Tags = BTreeMap<String, Option<String>>;

/// Desired or observed state of an environment
///
/// Built from user input on create/update and from provider state on read.
/// A model read back from the provider is never mutated in place;
/// translation always produces a new value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceModel {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,

    // Fixed at creation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kms_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub network_configuration: Option<NetworkConfiguration>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_role_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_bucket_arn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_s3_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins_s3_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugins_s3_object_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_s3_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requirements_s3_object_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_script_s3_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startup_script_s3_object_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airflow_configuration_options: Option<BTreeMap<String, String>>,

    // Operational properties
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment_class: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_workers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedulers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logging_configuration: Option<LoggingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_maintenance_window_start: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webserver_access_mode: Option<String>,

    /// Read-only, reported by the provider
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webserver_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Tags>,
}

impl ResourceModel {
    /// Create a model carrying only its identity
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Tags declared on the model, or an empty set
    pub fn tags_or_empty(&self) -> Tags {
        self.tags.clone().unwrap_or_default()
    }
}

/// Network placement, fixed once the environment exists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NetworkConfiguration {
    #[serde(default)]
    pub subnet_ids: Vec<String>,
    #[serde(default)]
    pub security_group_ids: Vec<String>,
}

/// Per-component log publishing settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoggingConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dag_processing_logs: Option<ModuleLoggingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduler_logs: Option<ModuleLoggingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webserver_logs: Option<ModuleLoggingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worker_logs: Option<ModuleLoggingConfiguration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_logs: Option<ModuleLoggingConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ModuleLoggingConfiguration {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    /// Output only; ignored on input
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloud_watch_log_group_arn: Option<String>,
}
