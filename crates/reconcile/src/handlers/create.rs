//! Create: guard, submit with retry, wait for AVAILABLE

use crate::context::{CallbackContext, HandlerContext, ProgressEvent};
use crate::error::HandlerError;
use crate::probe::StatusProber;
use crate::retry::{LogRetryListener, RetryError, call_with_retry};
use crate::status::LifecycleStatus;
use crate::translate::to_create_input;
use crate::types::{ResourceModel, TYPE_NAME};

pub(super) fn handle(
    ctx: &HandlerContext<'_>,
    model: &ResourceModel,
    mut callback: CallbackContext,
) -> Result<ProgressEvent, HandlerError> {
    let name = model.name.as_str();
    let prober = StatusProber::new(ctx.api);
    let delay = ctx.options.callback_delay_seconds;

    if callback.stabilizing {
        callback.polls += 1;
        return match prober.probe(name)? {
            Some(LifecycleStatus::Available) => {
                log::info!("{TYPE_NAME} [{name}] created");
                let model = prober.read_model(name, &ctx.options.reserved_tag_prefix)?;
                Ok(ProgressEvent::success(Some(model)))
            }
            Some(LifecycleStatus::CreateFailed) => {
                Err(HandlerError::not_stabilized("Creation failed"))
            }
            Some(status) => {
                log::info!("{TYPE_NAME} [{name}] is {status}, waiting");
                Ok(ProgressEvent::in_progress(model.clone(), callback, delay))
            }
            None => {
                log::info!("{TYPE_NAME} [{name}] not visible yet, waiting");
                Ok(ProgressEvent::in_progress(model.clone(), callback, delay))
            }
        };
    }

    prober.ensure_absent(name)?;

    let input = to_create_input(model);
    let policy = &ctx.options.retry;
    let mut listener = LogRetryListener::new("CreateEnvironment", name, policy.max_attempts);

    let arn = call_with_retry(policy, ctx.sleeper, &mut listener, || {
        ctx.api.create_environment(&input)
    })
    .map_err(|err| match err {
        RetryError::Exhausted { last, .. } => HandlerError::invalid_request(last.message()),
        RetryError::NotRetryable(err) => HandlerError::from_api(&err, name),
    })?;

    log::info!("{TYPE_NAME} [{name}] creation submitted: {arn}");
    callback.mark_submitted();

    let mut model = model.clone();
    model.arn = Some(arn);
    Ok(ProgressEvent::in_progress(model, callback, delay))
}
