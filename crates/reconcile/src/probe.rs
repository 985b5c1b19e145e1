//! Status probing and existence guards

use crate::client::{Environment, EnvironmentApi};
use crate::error::{ApiError, HandlerError};
use crate::status::LifecycleStatus;
use crate::translate::from_environment;
use crate::types::{ResourceModel, TYPE_NAME};

/// Reads the provider-side state of environments
pub struct StatusProber<'a> {
    api: &'a dyn EnvironmentApi,
}

impl<'a> StatusProber<'a> {
    pub fn new(api: &'a dyn EnvironmentApi) -> Self {
        Self { api }
    }

    /// Describe an environment, or `None` if the provider says it is absent
    pub fn describe(&self, name: &str) -> Result<Option<Environment>, ApiError> {
        log::debug!("Getting {TYPE_NAME} [{name}]");
        match self.api.get_environment(name) {
            Ok(env) => Ok(Some(env)),
            Err(ApiError::NotFound(_)) => {
                log::info!("{TYPE_NAME} [{name}] does not exist");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Current lifecycle status, `None` if absent
    pub fn probe(&self, name: &str) -> Result<Option<LifecycleStatus>, HandlerError> {
        let env = self
            .describe(name)
            .map_err(|e| HandlerError::from_api(&e, name))?;

        Ok(env.map(|env| {
            let status = LifecycleStatus::from(env.status.as_str());
            log::info!("{TYPE_NAME} [{name}] exists. Status: {status}");
            status
        }))
    }

    /// Error text of the most recent failed change, empty if none
    pub fn last_transition_error(&self, name: &str) -> Result<String, HandlerError> {
        let env = self
            .describe(name)
            .map_err(|e| HandlerError::from_api(&e, name))?;

        Ok(env
            .as_ref()
            .and_then(Environment::last_error_message)
            .unwrap_or_default()
            .to_string())
    }

    /// Fail with NotFound unless the environment exists
    pub fn ensure_exists(&self, name: &str) -> Result<(), HandlerError> {
        match self.probe(name)? {
            Some(_) => Ok(()),
            None => Err(HandlerError::not_found(name)),
        }
    }

    /// Fail with AlreadyExists if the environment exists
    pub fn ensure_absent(&self, name: &str) -> Result<(), HandlerError> {
        match self.probe(name)? {
            Some(_) => Err(HandlerError::already_exists(name)),
            None => Ok(()),
        }
    }

    /// Describe an environment that must exist
    pub fn read(&self, name: &str) -> Result<Environment, HandlerError> {
        self.describe(name)
            .map_err(|e| HandlerError::from_api(&e, name))?
            .ok_or_else(|| HandlerError::not_found(name))
    }

    /// Read an environment and translate it to a model
    pub fn read_model(
        &self,
        name: &str,
        reserved_prefix: &str,
    ) -> Result<ResourceModel, HandlerError> {
        let env = self.read(name)?;
        log::debug!("Got {TYPE_NAME} [{}]", env.name);
        Ok(from_environment(&env, reserved_prefix))
    }
}
