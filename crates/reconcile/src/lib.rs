//! # Reconcile
//!
//! A reconciliation engine for managed workflow environments
//! (`AWS::MWAA::Environment`).
//!
//! The engine drives an external, asynchronously-provisioned resource from
//! its current state to a desired state. It never blocks waiting for the
//! resource to settle: each invocation returns a [`ProgressEvent`] and, while
//! work is in flight, a [`CallbackContext`] that the caller's scheduler
//! replays after the requested delay.
//!
//! ## Core Concepts
//!
//! - **Operation**: Create, Read, Update, Delete or List, each a pure step
//!   function `(request, token) -> event`
//! - **Submit / Stabilize**: mutating operations first submit the change,
//!   then poll the status until it settles
//! - **StatusProber**: existence guards and status reads
//! - **TagReconciler**: computes tag additions and removals
//! - **Retry**: bounded exponential backoff around the create call
//!
//! ## Example
//!
//! ```ignore
//! use reconcile::{
//!     CallbackContext, HandlerContext, HandlerOptions, HandlerRequest, Operation, ResourceModel,
//! };
//!
//! let options = HandlerOptions::default();
//! let ctx = HandlerContext::new(&client, &options);
//! let request = HandlerRequest::for_model(ResourceModel::named("analytics"));
//!
//! let event = Operation::Create.handle(&ctx, &request, CallbackContext::default());
//! if !event.is_terminal() {
//!     // persist event.callback_context, call back after event.callback_delay_seconds
//! }
//! ```
//!
//! ## Provider Traits
//!
//! Collaborators are injected through traits:
//!
//! - [`EnvironmentApi`]: the provider's environment API
//! - [`Sleeper`]: waits between retry attempts
//! - [`RetryListener`]: observes retry attempts
//!
//! This keeps the engine free of any SDK, clock or logging backend.

pub mod client;
pub mod context;
pub mod driver;
pub mod error;
pub mod handlers;
pub mod probe;
pub mod retry;
pub mod status;
pub mod tags;
pub mod translate;
pub mod types;

#[cfg(test)]
mod mock;

pub use client::{
    CreateEnvironmentInput, Environment, EnvironmentApi, EnvironmentPage, LastUpdate,
    UpdateEnvironmentInput, UpdateError,
};
pub use context::{
    CallbackContext, HandlerContext, HandlerOptions, HandlerRequest, NoSleep, OperationStatus,
    ProgressEvent, Sleeper, ThreadSleeper,
};
pub use driver::{DEFAULT_MAX_INVOCATIONS, drive};
pub use error::{ApiError, ApiErrorKind, ApiResult, HandlerError, HandlerErrorCode};
pub use handlers::{Operation, UnknownOperation};
pub use probe::StatusProber;
pub use retry::{
    Attempt, LogRetryListener, NoListener, RetryError, RetryListener, RetryPolicy, call_with_retry,
};
pub use status::LifecycleStatus;
pub use tags::{RESERVED_TAG_PREFIX, TagDelta, TagReconciler};
pub use types::{
    LoggingConfiguration, ModuleLoggingConfiguration, NetworkConfiguration, ResourceModel,
    TYPE_NAME, Tags,
};
