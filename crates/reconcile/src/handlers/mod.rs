//! Operation handlers
//!
//! Each [`Operation`] turns one `(request, token)` pair into one
//! [`ProgressEvent`]. Mutating operations move through two phases:
//!
//! - **Submit** (`stabilizing == false`): existence guard, then the mutating
//!   call; the returned token has `stabilizing` set.
//! - **Stabilize** (`stabilizing == true`): probe the status and either finish
//!   or ask to be called back.
//!
//! Handlers never return errors. Every failure becomes a FAILED event.

mod create;
mod delete;
mod list;
mod read;
mod update;

use crate::context::{CallbackContext, HandlerContext, HandlerRequest, ProgressEvent};
use crate::error::HandlerError;
use crate::types::{ResourceModel, TYPE_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The operations the scheduler can invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
    List,
}

impl Operation {
    pub const ALL: [Self; 5] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::List,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::List => "list",
        }
    }

    /// Whether this operation polls until the provider settles
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Create | Self::Update | Self::Delete)
    }

    /// Run one invocation
    pub fn handle(
        &self,
        ctx: &HandlerContext<'_>,
        request: &HandlerRequest,
        callback: CallbackContext,
    ) -> ProgressEvent {
        log::debug!(
            "{self} {TYPE_NAME}: stabilizing={}, polls={}",
            callback.stabilizing,
            callback.polls
        );

        match self {
            Self::Create => with_model(request, |model| create::handle(ctx, model, callback)),
            Self::Read => with_model(request, |model| read::handle(ctx, model)),
            Self::Update => with_model(request, |model| {
                update::handle(ctx, request, model, callback)
            }),
            Self::Delete if request.desired_resource_state.is_none() => {
                log::info!("No desired state given, nothing to delete");
                ProgressEvent::success(None)
            }
            Self::Delete => with_model(request, |model| delete::handle(ctx, model, callback)),
            Self::List => list::handle(ctx, request).unwrap_or_else(|err| failed(None, err)),
        }
    }
}

/// Run `step` against the desired model, folding errors into a FAILED event
fn with_model<F>(request: &HandlerRequest, step: F) -> ProgressEvent
where
    F: FnOnce(&ResourceModel) -> Result<ProgressEvent, HandlerError>,
{
    let model = match request.require_model() {
        Ok(model) => model,
        Err(err) => return failed(None, err),
    };

    if model.name.is_empty() {
        let err = HandlerError::invalid_request("Name is required");
        return failed(Some(model.clone()), err);
    }

    step(model).unwrap_or_else(|err| failed(Some(model.clone()), err))
}

fn failed(model: Option<ResourceModel>, err: HandlerError) -> ProgressEvent {
    log::warn!("{TYPE_NAME}: {err}");
    ProgressEvent::failed(model, err)
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation name that matched none of the known operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown operation '{0}' (expected create, read, update, delete or list)")]
pub struct UnknownOperation(pub String);

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{HandlerOptions, NoSleep};
    use crate::error::HandlerErrorCode;
    use crate::mock::MockEnvironmentApi;

    #[test]
    fn test_parse_operation() {
        assert_eq!("create".parse::<Operation>().unwrap(), Operation::Create);
        assert_eq!("LIST".parse::<Operation>().unwrap(), Operation::List);
        assert!("destroy".parse::<Operation>().is_err());
        assert_eq!(Operation::Delete.to_string(), "delete");
    }

    #[test]
    fn test_missing_model_is_invalid_request() {
        let api = MockEnvironmentApi::new();
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        for op in [Operation::Create, Operation::Read, Operation::Update] {
            let event = op.handle(&ctx, &HandlerRequest::default(), CallbackContext::default());
            assert!(event.is_terminal());
            assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        }
        assert!(api.calls().is_empty());
    }

    #[test]
    fn test_empty_name_is_invalid_request() {
        let api = MockEnvironmentApi::new();
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = HandlerRequest::for_model(ResourceModel::default());
        let event = Operation::Create.handle(&ctx, &request, CallbackContext::default());
        assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        assert_eq!(
            event.message.as_deref(),
            Some("Invalid request provided: Name is required")
        );
    }
}
