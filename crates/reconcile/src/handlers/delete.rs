//! Delete: guard, submit, wait until gone

use crate::context::{CallbackContext, HandlerContext, ProgressEvent};
use crate::error::HandlerError;
use crate::probe::StatusProber;
use crate::status::LifecycleStatus;
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
            None | Some(LifecycleStatus::Deleted) => {
                log::info!("{TYPE_NAME} [{name}] deleted");
                Ok(ProgressEvent::success(None))
            }
            Some(status) => {
                log::info!("{TYPE_NAME} [{name}] is {status}, waiting");
                Ok(ProgressEvent::in_progress(model.clone(), callback, delay))
            }
        };
    }

    prober.ensure_exists(name)?;

    ctx.api
        .delete_environment(name)
        .map_err(|err| HandlerError::from_api(&err, name))?;

    log::info!("{TYPE_NAME} [{name}] deletion submitted");
    callback.mark_submitted();
    Ok(ProgressEvent::in_progress(model.clone(), callback, delay))
}
