use crate::context::{HandlerContext, ProgressEvent};
use crate::error::HandlerError;
use crate::probe::StatusProber;
use crate::types::ResourceModel;

pub(super) fn handle(
    ctx: &HandlerContext<'_>,
    model: &ResourceModel,
) -> Result<ProgressEvent, HandlerError> {
    let model = StatusProber::new(ctx.api)
        .read_model(&model.name, &ctx.options.reserved_tag_prefix)?;
    Ok(ProgressEvent::success(Some(model)))
}
