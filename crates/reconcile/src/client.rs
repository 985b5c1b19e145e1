//! Provider API boundary
//!
//! The engine never talks to the network itself. Callers hand it an
//! implementation of [`EnvironmentApi`] with credentials already in place.

use crate::error::ApiResult;
use crate::types::{LoggingConfiguration, NetworkConfiguration, Tags};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Synchronous client for the environment API
///
/// Implementations report provider conditions through
/// [`ApiError`](crate::ApiError); not-found must be reported as
/// `ApiError::NotFound` so the engine can tell absence from failure.
pub trait EnvironmentApi {
    /// Submit creation, returning the new environment's ARN
    fn create_environment(&self, input: &CreateEnvironmentInput) -> ApiResult<String>;

    /// Describe an environment by name
    fn get_environment(&self, name: &str) -> ApiResult<Environment>;

    /// Submit an update, returning the environment's ARN
    fn update_environment(&self, input: &UpdateEnvironmentInput) -> ApiResult<String>;

    /// Submit deletion
    fn delete_environment(&self, name: &str) -> ApiResult<()>;

    /// List environment names, one page at a time
    fn list_environments(&self, next_token: Option<&str>) -> ApiResult<EnvironmentPage>;

    /// Add or overwrite tags
    fn tag_resource(&self, arn: &str, tags: &Tags) -> ApiResult<()>;

    /// Remove tags by key
    fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()>;
}

/// An environment as described by the provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub name: String,
    pub arn: String,
    /// Raw status string, see [`LifecycleStatus`](crate::LifecycleStatus)
    pub status: String,
    #[serde(default)]
    pub execution_role_arn: Option<String>,
    #[serde(default)]
    pub kms_key: Option<String>,
    #[serde(default)]
    pub airflow_version: Option<String>,
    #[serde(default)]
    pub source_bucket_arn: Option<String>,
    #[serde(default)]
    pub dag_s3_path: Option<String>,
    #[serde(default)]
    pub plugins_s3_path: Option<String>,
    #[serde(default)]
    pub plugins_s3_object_version: Option<String>,
    #[serde(default)]
    pub requirements_s3_path: Option<String>,
    #[serde(default)]
    pub requirements_s3_object_version: Option<String>,
    #[serde(default)]
    pub startup_script_s3_path: Option<String>,
    #[serde(default)]
    pub startup_script_s3_object_version: Option<String>,
    #[serde(default)]
    pub airflow_configuration_options: BTreeMap<String, String>,
    #[serde(default)]
    pub environment_class: Option<String>,
    #[serde(default)]
    pub max_workers: Option<u32>,
    #[serde(default)]
    pub min_workers: Option<u32>,
    #[serde(default)]
    pub schedulers: Option<u32>,
    #[serde(default)]
    pub network_configuration: Option<NetworkConfiguration>,
    #[serde(default)]
    pub logging_configuration: Option<LoggingConfiguration>,
    #[serde(default)]
    pub weekly_maintenance_window_start: Option<String>,
    #[serde(default)]
    pub webserver_access_mode: Option<String>,
    #[serde(default)]
    pub webserver_url: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default)]
    pub last_update: Option<LastUpdate>,
}

/// Outcome of the most recent change applied to an environment
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastUpdate {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error: Option<UpdateError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateError {
    #[serde(default)]
    pub error_code: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Request body for environment creation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateEnvironmentInput {
    pub name: String,
    pub execution_role_arn: Option<String>,
    pub kms_key: Option<String>,
    pub airflow_version: Option<String>,
    pub source_bucket_arn: Option<String>,
    pub dag_s3_path: Option<String>,
    pub plugins_s3_path: Option<String>,
    pub plugins_s3_object_version: Option<String>,
    pub requirements_s3_path: Option<String>,
    pub requirements_s3_object_version: Option<String>,
    pub startup_script_s3_path: Option<String>,
    pub startup_script_s3_object_version: Option<String>,
    pub airflow_configuration_options: BTreeMap<String, String>,
    pub environment_class: Option<String>,
    pub max_workers: Option<u32>,
    pub min_workers: Option<u32>,
    pub schedulers: Option<u32>,
    pub network_configuration: Option<NetworkConfiguration>,
    pub logging_configuration: Option<LoggingConfiguration>,
    pub weekly_maintenance_window_start: Option<String>,
    pub webserver_access_mode: Option<String>,
    pub tags: Tags,
}

/// Request body for an environment update
///
/// Creation-only properties (KMS key, subnets) and tags are absent: tags go
/// through the tagging calls instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEnvironmentInput {
    pub name: String,
    pub execution_role_arn: Option<String>,
    pub airflow_version: Option<String>,
    pub source_bucket_arn: Option<String>,
    pub dag_s3_path: Option<String>,
    pub plugins_s3_path: Option<String>,
    pub plugins_s3_object_version: Option<String>,
    pub requirements_s3_path: Option<String>,
    pub requirements_s3_object_version: Option<String>,
    pub startup_script_s3_path: Option<String>,
    pub startup_script_s3_object_version: Option<String>,
    pub airflow_configuration_options: BTreeMap<String, String>,
    pub environment_class: Option<String>,
    pub max_workers: Option<u32>,
    pub min_workers: Option<u32>,
    pub schedulers: Option<u32>,
    pub security_group_ids: Option<Vec<String>>,
    pub logging_configuration: Option<LoggingConfiguration>,
    pub weekly_maintenance_window_start: Option<String>,
    pub webserver_access_mode: Option<String>,
}

/// One page of environment names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentPage {
    pub environments: Vec<String>,
    pub next_token: Option<String>,
}

impl Environment {
    /// Message of the last failed change, if the provider reported one
    pub fn last_error_message(&self) -> Option<&str> {
        self.last_update
            .as_ref()
            .and_then(|u| u.error.as_ref())
            .and_then(|e| e.error_message.as_deref())
    }
}
