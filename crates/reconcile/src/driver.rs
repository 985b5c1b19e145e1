//! In-process scheduler loop
//!
//! Stands in for the external scheduler: invokes an operation, hands the
//! requested callback delay to `wait`, and replays the returned token until
//! the operation is terminal.

use crate::context::{CallbackContext, HandlerContext, HandlerRequest, ProgressEvent};
use crate::handlers::Operation;
use anyhow::{Result, bail};
use std::time::Duration;

/// Default ceiling on invocations for one operation
pub const DEFAULT_MAX_INVOCATIONS: u32 = 720;

/// Drive `operation` to a terminal event
///
/// Returns every event in order; the last one is terminal. Fails only if
/// the operation is still in progress after `max_invocations`.
pub fn drive<W>(
    operation: Operation,
    ctx: &HandlerContext<'_>,
    request: &HandlerRequest,
    max_invocations: u32,
    mut wait: W,
) -> Result<Vec<ProgressEvent>>
where
    W: FnMut(Duration, &ProgressEvent),
{
    let mut events = Vec::new();
    let mut token = CallbackContext::default();

    for invocation in 1..=max_invocations.max(1) {
        let event = operation.handle(ctx, request, token);
        log::debug!("{operation} invocation {invocation}: {:?}", event.status);

        if event.is_terminal() {
            events.push(event);
            return Ok(events);
        }

        token = event.callback_context.clone().unwrap_or_default();
        wait(
            Duration::from_secs(u64::from(event.callback_delay_seconds)),
            &event,
        );
        events.push(event);
    }

    bail!("{operation} still in progress after {max_invocations} invocations")
}
