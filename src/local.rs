//! Local simulated provider
//!
//! Implements the environment API against a TOML file in the state
//! directory. Mutating calls put an environment into a transitional status
//! that settles after a fixed number of status reads, so the handlers'
//! stabilize loop can be exercised without a cloud account.

use anyhow::Result;
use reconcile::{
    ApiError, ApiResult, CreateEnvironmentInput, Environment, EnvironmentApi, EnvironmentPage,
    LifecycleStatus, Tags, UpdateEnvironmentInput,
};
use std::path::PathBuf;

use crate::state::{LocalEnvironment, LocalState};

const PAGE_SIZE: usize = 25;
const ARN_PREFIX: &str = "arn:aws:airflow:local:000000000000:environment/";

/// File-backed provider; every call loads the state file and saves it back
/// when the environments changed
pub struct LocalProvider {
    path: PathBuf,
    settle_polls: u32,
    reserved_tag_prefix: String,
}

impl LocalProvider {
    pub fn new(path: PathBuf, settle_polls: u32, reserved_tag_prefix: &str) -> Self {
        Self {
            path,
            settle_polls,
            reserved_tag_prefix: reserved_tag_prefix.to_string(),
        }
    }

    /// Open the provider at the default state location
    pub fn open(settle_polls: u32, reserved_tag_prefix: &str) -> Result<Self> {
        Ok(Self::new(
            LocalState::path()?,
            settle_polls,
            reserved_tag_prefix,
        ))
    }

    fn with_state<T>(&self, f: impl FnOnce(&mut LocalState) -> ApiResult<T>) -> ApiResult<T> {
        let mut state = LocalState::load_from(&self.path).map_err(storage_error)?;
        let before = state.environments.clone();
        let result = f(&mut state);
        // A settle to DELETED changes state and still returns NotFound
        if state.environments != before {
            state.save_to(&self.path).map_err(storage_error)?;
        }
        result
    }

    fn check_tag_keys(&self, tags: &Tags) -> ApiResult<()> {
        match tags.keys().find(|k| k.starts_with(&self.reserved_tag_prefix)) {
            Some(key) => Err(ApiError::Validation(format!(
                "Tag key '{key}' uses the reserved prefix '{}'",
                self.reserved_tag_prefix
            ))),
            None => Ok(()),
        }
    }
}

fn storage_error(err: anyhow::Error) -> ApiError {
    ApiError::Other(format!("{err:#}"))
}

fn not_found(name: &str) -> ApiError {
    ApiError::NotFound(format!("Environment {name} does not exist"))
}

fn check_workers(min: Option<u32>, max: Option<u32>) -> ApiResult<()> {
    match (min, max) {
        (Some(min), Some(max)) if min > max => Err(ApiError::Validation(format!(
            "MinWorkers ({min}) cannot be greater than MaxWorkers ({max})"
        ))),
        _ => Ok(()),
    }
}

impl EnvironmentApi for LocalProvider {
    fn create_environment(&self, input: &CreateEnvironmentInput) -> ApiResult<String> {
        check_workers(input.min_workers, input.max_workers)?;
        self.check_tag_keys(&input.tags)?;

        self.with_state(|state| {
            if state.environments.contains_key(&input.name) {
                return Err(ApiError::Validation(format!(
                    "Environment {} already exists",
                    input.name
                )));
            }

            let arn = format!("{ARN_PREFIX}{}", input.name);
            let mut local = LocalEnvironment {
                pending_reads: 0,
                settles_to: None,
                environment: Environment {
                    name: input.name.clone(),
                    arn: arn.clone(),
                    status: String::new(),
                    execution_role_arn: input.execution_role_arn.clone(),
                    kms_key: input.kms_key.clone(),
                    airflow_version: input.airflow_version.clone(),
                    source_bucket_arn: input.source_bucket_arn.clone(),
                    dag_s3_path: input.dag_s3_path.clone(),
                    plugins_s3_path: input.plugins_s3_path.clone(),
                    plugins_s3_object_version: input.plugins_s3_object_version.clone(),
                    requirements_s3_path: input.requirements_s3_path.clone(),
                    requirements_s3_object_version: input.requirements_s3_object_version.clone(),
                    startup_script_s3_path: input.startup_script_s3_path.clone(),
                    startup_script_s3_object_version: input
                        .startup_script_s3_object_version
                        .clone(),
                    airflow_configuration_options: input.airflow_configuration_options.clone(),
                    environment_class: input.environment_class.clone(),
                    max_workers: input.max_workers,
                    min_workers: input.min_workers,
                    schedulers: input.schedulers,
                    network_configuration: input.network_configuration.clone(),
                    logging_configuration: input.logging_configuration.clone(),
                    weekly_maintenance_window_start: input.weekly_maintenance_window_start.clone(),
                    webserver_access_mode: input.webserver_access_mode.clone(),
                    webserver_url: Some(format!("{}.airflow.local", input.name)),
                    tags: input.tags.clone(),
                    last_update: None,
                },
            };
            local.begin(
                LifecycleStatus::Creating.as_str(),
                LifecycleStatus::Available.as_str(),
                self.settle_polls,
            );

            log::info!("Local provider: creating {}", input.name);
            state.environments.insert(input.name.clone(), local);
            Ok(arn)
        })
    }

    fn get_environment(&self, name: &str) -> ApiResult<Environment> {
        self.with_state(|state| {
            let local = state
                .environments
                .get_mut(name)
                .ok_or_else(|| not_found(name))?;
            local.observe();

            if LifecycleStatus::from(local.environment.status.as_str()) == LifecycleStatus::Deleted
            {
                state.environments.remove(name);
                return Err(not_found(name));
            }

            Ok(local.environment.clone())
        })
    }

    fn update_environment(&self, input: &UpdateEnvironmentInput) -> ApiResult<String> {
        self.with_state(|state| {
            let local = state
                .environments
                .get_mut(&input.name)
                .ok_or_else(|| not_found(&input.name))?;

            let status = LifecycleStatus::from(local.environment.status.as_str());
            if status != LifecycleStatus::Available && status != LifecycleStatus::UpdateFailed {
                return Err(ApiError::Validation(format!(
                    "Environment {} is {status} and cannot be updated",
                    input.name
                )));
            }

            let min = input.min_workers.or(local.environment.min_workers);
            let max = input.max_workers.or(local.environment.max_workers);
            check_workers(min, max)?;

            let env = &mut local.environment;
            macro_rules! set_if_some {
                ($($field:ident),* $(,)?) => {
                    $(if input.$field.is_some() { env.$field = input.$field.clone(); })*
                };
            }
            set_if_some!(
                execution_role_arn,
                airflow_version,
                source_bucket_arn,
                dag_s3_path,
                plugins_s3_path,
                plugins_s3_object_version,
                requirements_s3_path,
                requirements_s3_object_version,
                startup_script_s3_path,
                startup_script_s3_object_version,
                environment_class,
                max_workers,
                min_workers,
                schedulers,
                logging_configuration,
                weekly_maintenance_window_start,
                webserver_access_mode,
            );
            env.airflow_configuration_options = input.airflow_configuration_options.clone();
            if let (Some(groups), Some(network)) =
                (&input.security_group_ids, env.network_configuration.as_mut())
            {
                network.security_group_ids = groups.clone();
            }
            env.last_update = None;

            local.begin(
                LifecycleStatus::Updating.as_str(),
                LifecycleStatus::Available.as_str(),
                self.settle_polls,
            );

            log::info!("Local provider: updating {}", input.name);
            Ok(local.environment.arn.clone())
        })
    }

    fn delete_environment(&self, name: &str) -> ApiResult<()> {
        self.with_state(|state| {
            let local = state
                .environments
                .get_mut(name)
                .ok_or_else(|| not_found(name))?;

            local.begin(
                LifecycleStatus::Deleting.as_str(),
                LifecycleStatus::Deleted.as_str(),
                self.settle_polls,
            );

            log::info!("Local provider: deleting {name}");
            Ok(())
        })
    }

    fn list_environments(&self, next_token: Option<&str>) -> ApiResult<EnvironmentPage> {
        let start = match next_token {
            Some(token) => token
                .parse::<usize>()
                .map_err(|_| ApiError::Validation(format!("Invalid next token: {token}")))?,
            None => 0,
        };

        self.with_state(|state| {
            let names: Vec<String> = state
                .environments
                .keys()
                .skip(start)
                .take(PAGE_SIZE)
                .cloned()
                .collect();

            let end = start + names.len();
            let next_token = (end < state.environments.len()).then(|| end.to_string());

            Ok(EnvironmentPage {
                environments: names,
                next_token,
            })
        })
    }

    fn tag_resource(&self, arn: &str, tags: &Tags) -> ApiResult<()> {
        self.check_tag_keys(tags)?;

        self.with_state(|state| {
            let local = state
                .find_by_arn_mut(arn)
                .ok_or_else(|| ApiError::NotFound(format!("Resource {arn} does not exist")))?;
            local.environment.tags.extend(tags.clone());
            Ok(())
        })
    }

    fn untag_resource(&self, arn: &str, keys: &[String]) -> ApiResult<()> {
        self.with_state(|state| {
            let local = state
                .find_by_arn_mut(arn)
                .ok_or_else(|| ApiError::NotFound(format!("Resource {arn} does not exist")))?;
            for key in keys {
                local.environment.tags.remove(key);
            }
            Ok(())
        })
    }
}
