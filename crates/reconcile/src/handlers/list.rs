use crate::context::{HandlerContext, HandlerRequest, ProgressEvent};
use crate::error::HandlerError;
use crate::translate::from_page;
use crate::types::TYPE_NAME;

pub(super) fn handle(
    ctx: &HandlerContext<'_>,
    request: &HandlerRequest,
) -> Result<ProgressEvent, HandlerError> {
    let page = ctx
        .api
        .list_environments(request.next_token.as_deref())
        .map_err(|err| HandlerError::from_api(&err, TYPE_NAME))?;

    log::debug!(
        "Listed {} {TYPE_NAME} resources, more: {}",
        page.environments.len(),
        page.next_token.is_some()
    );
    Ok(ProgressEvent::page(from_page(&page), page.next_token))
}
