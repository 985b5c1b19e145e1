//! Invocation context and scheduler-facing types
//!
//! Every handler invocation receives its collaborators explicitly through a
//! [`HandlerContext`] and exchanges state with the external scheduler only
//! through a [`CallbackContext`] and a [`ProgressEvent`].

use crate::client::EnvironmentApi;
use crate::error::{HandlerError, HandlerErrorCode};
use crate::retry::RetryPolicy;
use crate::tags::{RESERVED_TAG_PREFIX, strip_reserved};
use crate::types::{ResourceModel, Tags};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Blocking wait used between retry attempts
///
/// Implement this trait to replace real sleeping, e.g. in tests.
pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

/// Sleeper backed by `std::thread::sleep`
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Sleeper that returns immediately
pub struct NoSleep;

impl Sleeper for NoSleep {
    fn sleep(&self, _duration: Duration) {}
}

/// Continuation token persisted by the scheduler between invocations
///
/// Created empty at the start of an operation. The scheduler replays it
/// verbatim; it is dropped once a terminal event is returned.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackContext {
    /// Set once the mutating call has been submitted
    #[serde(default)]
    pub stabilizing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    /// Status checks made while stabilizing
    #[serde(default)]
    pub polls: u32,
}

impl CallbackContext {
    /// Record that the mutating call went through
    pub fn mark_submitted(&mut self) {
        self.stabilizing = true;
        self.submitted_at = Some(Utc::now());
    }
}

/// Input handed to a handler by the scheduler
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HandlerRequest {
    #[serde(default)]
    pub desired_resource_state: Option<ResourceModel>,
    /// Tags the scheduler's platform attaches to every resource
    #[serde(default)]
    pub system_tags: Tags,
    /// Stack-level tags declared outside the model
    #[serde(default)]
    pub desired_resource_tags: Tags,
    /// List pagination token
    #[serde(default)]
    pub next_token: Option<String>,
}

impl HandlerRequest {
    pub fn for_model(model: ResourceModel) -> Self {
        Self {
            desired_resource_state: Some(model),
            ..Self::default()
        }
    }

    /// Desired model, or an invalid-request failure
    pub fn require_model(&self) -> Result<&ResourceModel, HandlerError> {
        self.desired_resource_state
            .as_ref()
            .ok_or_else(|| HandlerError::invalid_request("desired resource state is required"))
    }

    /// All desired tags, later sources winning: system, stack, model
    ///
    /// Keys under the reserved prefix are dropped.
    pub fn desired_tags(&self, reserved_prefix: &str) -> Tags {
        let mut merged = self.system_tags.clone();
        merged.extend(self.desired_resource_tags.clone());
        if let Some(model) = &self.desired_resource_state {
            merged.extend(model.tags_or_empty());
        }
        strip_reserved(Some(&merged), reserved_prefix)
    }
}

/// Overall state of an operation after one invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationStatus {
    InProgress,
    Success,
    Failed,
}

/// Result of one handler invocation, returned to the scheduler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    pub status: OperationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_model: Option<ResourceModel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_models: Option<Vec<ResourceModel>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_context: Option<CallbackContext>,
    #[serde(default)]
    pub callback_delay_seconds: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<HandlerErrorCode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ProgressEvent {
    fn empty(status: OperationStatus) -> Self {
        Self {
            status,
            resource_model: None,
            resource_models: None,
            callback_context: None,
            callback_delay_seconds: 0,
            next_token: None,
            error_code: None,
            message: None,
        }
    }

    /// Not done yet; call back after `delay_seconds` with `context`
    pub fn in_progress(model: ResourceModel, context: CallbackContext, delay_seconds: u32) -> Self {
        Self {
            resource_model: Some(model),
            callback_context: Some(context),
            callback_delay_seconds: delay_seconds,
            ..Self::empty(OperationStatus::InProgress)
        }
    }

    pub fn success(model: Option<ResourceModel>) -> Self {
        Self {
            resource_model: model,
            ..Self::empty(OperationStatus::Success)
        }
    }

    /// One page of a list operation
    pub fn page(models: Vec<ResourceModel>, next_token: Option<String>) -> Self {
        Self {
            resource_models: Some(models),
            next_token,
            ..Self::empty(OperationStatus::Success)
        }
    }

    pub fn failed(model: Option<ResourceModel>, error: HandlerError) -> Self {
        Self {
            resource_model: model,
            error_code: Some(error.code),
            message: Some(error.message),
            ..Self::empty(OperationStatus::Failed)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status != OperationStatus::InProgress
    }

    pub fn is_success(&self) -> bool {
        self.status == OperationStatus::Success
    }
}

/// Tunables shared by all handlers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    /// Delay requested from the scheduler while an operation is in flight
    pub callback_delay_seconds: u32,
    /// Retry policy for the create call
    pub retry: RetryPolicy,
    pub reserved_tag_prefix: String,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        Self {
            callback_delay_seconds: 60,
            retry: RetryPolicy::default(),
            reserved_tag_prefix: RESERVED_TAG_PREFIX.to_string(),
        }
    }
}

/// Collaborators for one handler invocation
pub struct HandlerContext<'a> {
    pub api: &'a dyn EnvironmentApi,
    pub options: &'a HandlerOptions,
    pub sleeper: &'a dyn Sleeper,
}

impl<'a> HandlerContext<'a> {
    /// Create a context that sleeps for real between retries
    pub fn new(api: &'a dyn EnvironmentApi, options: &'a HandlerOptions) -> Self {
        Self {
            api,
            options,
            sleeper: &ThreadSleeper,
        }
    }

    /// Create a context with a custom sleeper
    pub fn with_sleeper(
        api: &'a dyn EnvironmentApi,
        options: &'a HandlerOptions,
        sleeper: &'a dyn Sleeper,
    ) -> Self {
        Self {
            api,
            options,
            sleeper,
        }
    }
}
