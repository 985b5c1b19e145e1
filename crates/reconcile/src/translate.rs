//! Field mapping between the resource model and provider records

use crate::client::{CreateEnvironmentInput, Environment, EnvironmentPage, UpdateEnvironmentInput};
use crate::tags::strip_reserved;
use crate::types::{LoggingConfiguration, ModuleLoggingConfiguration, ResourceModel};

/// Build the creation request for a model
pub fn to_create_input(model: &ResourceModel) -> CreateEnvironmentInput {
    CreateEnvironmentInput {
        name: model.name.clone(),
        execution_role_arn: model.execution_role_arn.clone(),
        kms_key: model.kms_key.clone(),
        airflow_version: model.airflow_version.clone(),
        source_bucket_arn: model.source_bucket_arn.clone(),
        dag_s3_path: model.dag_s3_path.clone(),
        plugins_s3_path: model.plugins_s3_path.clone(),
        plugins_s3_object_version: model.plugins_s3_object_version.clone(),
        requirements_s3_path: model.requirements_s3_path.clone(),
        requirements_s3_object_version: model.requirements_s3_object_version.clone(),
        startup_script_s3_path: model.startup_script_s3_path.clone(),
        startup_script_s3_object_version: model.startup_script_s3_object_version.clone(),
        airflow_configuration_options: model
            .airflow_configuration_options
            .clone()
            .unwrap_or_default(),
        environment_class: model.environment_class.clone(),
        max_workers: model.max_workers,
        min_workers: model.min_workers,
        schedulers: model.schedulers,
        network_configuration: model.network_configuration.clone(),
        logging_configuration: model.logging_configuration.as_ref().map(logging_input),
        weekly_maintenance_window_start: model.weekly_maintenance_window_start.clone(),
        webserver_access_mode: model.webserver_access_mode.clone(),
        tags: model.tags_or_empty(),
    }
}

/// Build the update request for a model
///
/// Only security groups can change on an existing network placement.
pub fn to_update_input(model: &ResourceModel) -> UpdateEnvironmentInput {
    UpdateEnvironmentInput {
        name: model.name.clone(),
        execution_role_arn: model.execution_role_arn.clone(),
        airflow_version: model.airflow_version.clone(),
        source_bucket_arn: model.source_bucket_arn.clone(),
        dag_s3_path: model.dag_s3_path.clone(),
        plugins_s3_path: model.plugins_s3_path.clone(),
        plugins_s3_object_version: model.plugins_s3_object_version.clone(),
        requirements_s3_path: model.requirements_s3_path.clone(),
        requirements_s3_object_version: model.requirements_s3_object_version.clone(),
        startup_script_s3_path: model.startup_script_s3_path.clone(),
        startup_script_s3_object_version: model.startup_script_s3_object_version.clone(),
        airflow_configuration_options: model
            .airflow_configuration_options
            .clone()
            .unwrap_or_default(),
        environment_class: model.environment_class.clone(),
        max_workers: model.max_workers,
        min_workers: model.min_workers,
        schedulers: model.schedulers,
        security_group_ids: model
            .network_configuration
            .as_ref()
            .map(|n| n.security_group_ids.clone()),
        logging_configuration: model.logging_configuration.as_ref().map(logging_input),
        weekly_maintenance_window_start: model.weekly_maintenance_window_start.clone(),
        webserver_access_mode: model.webserver_access_mode.clone(),
    }
}

/// Build a model from a described environment, dropping reserved tags
pub fn from_environment(env: &Environment, reserved_prefix: &str) -> ResourceModel {
    ResourceModel {
        name: env.name.clone(),
        arn: Some(env.arn.clone()),
        kms_key: env.kms_key.clone(),
        network_configuration: env.network_configuration.clone(),
        execution_role_arn: env.execution_role_arn.clone(),
        airflow_version: env.airflow_version.clone(),
        source_bucket_arn: env.source_bucket_arn.clone(),
        dag_s3_path: env.dag_s3_path.clone(),
        plugins_s3_path: env.plugins_s3_path.clone(),
        plugins_s3_object_version: env.plugins_s3_object_version.clone(),
        requirements_s3_path: env.requirements_s3_path.clone(),
        requirements_s3_object_version: env.requirements_s3_object_version.clone(),
        startup_script_s3_path: env.startup_script_s3_path.clone(),
        startup_script_s3_object_version: env.startup_script_s3_object_version.clone(),
        airflow_configuration_options: Some(env.airflow_configuration_options.clone()),
        environment_class: env.environment_class.clone(),
        max_workers: env.max_workers,
        min_workers: env.min_workers,
        schedulers: env.schedulers,
        logging_configuration: env.logging_configuration.clone(),
        weekly_maintenance_window_start: env.weekly_maintenance_window_start.clone(),
        webserver_access_mode: env.webserver_access_mode.clone(),
        webserver_url: env.webserver_url.clone(),
        tags: Some(strip_reserved(Some(&env.tags), reserved_prefix)),
    }
}

/// Name-only models for a list page
pub fn from_page(page: &EnvironmentPage) -> Vec<ResourceModel> {
    page.environments
        .iter()
        .map(|name| ResourceModel::named(name.clone()))
        .collect()
}

fn logging_input(config: &LoggingConfiguration) -> LoggingConfiguration {
    let module = |m: &Option<ModuleLoggingConfiguration>| {
        m.as_ref().map(|m| ModuleLoggingConfiguration {
            enabled: m.enabled,
            log_level: m.log_level.clone(),
            cloud_watch_log_group_arn: None,
        })
    };

    LoggingConfiguration {
        dag_processing_logs: module(&config.dag_processing_logs),
        scheduler_logs: module(&config.scheduler_logs),
        webserver_logs: module(&config.webserver_logs),
        worker_logs: module(&config.worker_logs),
        task_logs: module(&config.task_logs),
    }
}
