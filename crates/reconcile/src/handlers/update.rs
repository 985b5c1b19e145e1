//! Update: reconcile tags, submit, wait for AVAILABLE

use crate::context::{CallbackContext, HandlerContext, HandlerRequest, ProgressEvent};
use crate::error::{ApiError, HandlerError};
use crate::probe::StatusProber;
use crate::status::LifecycleStatus;
use crate::tags::{TagReconciler, format_keys, format_tags};
use crate::translate::to_update_input;
use crate::types::{ResourceModel, TYPE_NAME};

pub(super) fn handle(
    ctx: &HandlerContext<'_>,
    request: &HandlerRequest,
    model: &ResourceModel,
    mut callback: CallbackContext,
) -> Result<ProgressEvent, HandlerError> {
    let name = model.name.as_str();
    let prober = StatusProber::new(ctx.api);
    let delay = ctx.options.callback_delay_seconds;

    if callback.stabilizing {
        callback.polls += 1;
        return match prober.probe(name)? {
            None => Err(HandlerError::not_stabilized(
                "Update failed, resource no longer exists",
            )),
            Some(LifecycleStatus::Available) => {
                log::info!("{TYPE_NAME} [{name}] updated");
                let model = prober.read_model(name, &ctx.options.reserved_tag_prefix)?;
                Ok(ProgressEvent::success(Some(model)))
            }
            Some(LifecycleStatus::UpdateFailed) => {
                let detail = prober.last_transition_error(name)?;
                Err(HandlerError::not_stabilized(format!("Update failed. {detail}")))
            }
            Some(LifecycleStatus::Unavailable) => {
                let detail = prober.last_transition_error(name)?;
                Err(HandlerError::not_stabilized(format!(
                    "Update failed, Environment unavailable. {detail}"
                )))
            }
            Some(status) => {
                log::info!("{TYPE_NAME} [{name}] is {status}, waiting");
                Ok(ProgressEvent::in_progress(model.clone(), callback, delay))
            }
        };
    }

    let current = prober.read(name)?;
    let prefix = &ctx.options.reserved_tag_prefix;
    let desired = request.desired_tags(prefix);
    let delta = TagReconciler::with_prefix(Some(&current.tags), prefix).delta(Some(&desired));

    // Removals first so a key changing case does not collide with itself
    if !delta.to_remove.is_empty() {
        log::info!(
            "Removing tags {} from {TYPE_NAME} [{name}]",
            format_keys(&delta.to_remove)
        );
        let keys: Vec<String> = delta.to_remove.iter().cloned().collect();
        ctx.api
            .untag_resource(&current.arn, &keys)
            .map_err(|err| submit_error(&err, name))?;
    }

    if !delta.to_add.is_empty() {
        log::info!(
            "Adding tags {} to {TYPE_NAME} [{name}]",
            format_tags(&delta.to_add)
        );
        ctx.api
            .tag_resource(&current.arn, &delta.to_add)
            .map_err(|err| submit_error(&err, name))?;
    }

    let arn = ctx
        .api
        .update_environment(&to_update_input(model))
        .map_err(|err| submit_error(&err, name))?;

    log::info!("{TYPE_NAME} [{name}] update submitted: {arn}");
    callback.mark_submitted();

    let mut model = model.clone();
    model.arn = Some(arn);
    Ok(ProgressEvent::in_progress(model, callback, delay))
}

/// Not-found here means the environment vanished after it was read
fn submit_error(err: &ApiError, name: &str) -> HandlerError {
    match err {
        ApiError::NotFound(_) => HandlerError::not_updatable(name),
        ApiError::Validation(message) => HandlerError::invalid_request(message),
        other => HandlerError::from_api(other, name),
    }
}

#[cfg(test)]
mod tests {
    use crate::context::{
        CallbackContext, HandlerContext, HandlerOptions, HandlerRequest, NoSleep, OperationStatus,
    };
    use crate::error::{ApiError, HandlerErrorCode};
    use crate::handlers::Operation;
    use crate::mock::{MockEnvironmentApi, environment};
    use crate::types::{ResourceModel, Tags};

    fn stabilizing() -> CallbackContext {
        CallbackContext {
            stabilizing: true,
            ..CallbackContext::default()
        }
    }

    fn request_with_tags(pairs: &[(&str, Option<&str>)]) -> HandlerRequest {
        let mut model = ResourceModel::named("env");
        model.max_workers = Some(10);
        model.tags = Some(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.map(str::to_string)))
                .collect::<Tags>(),
        );
        HandlerRequest::for_model(model)
    }

    #[test]
    fn test_submit_reconciles_live_tags_removals_first() {
        let live = environment("env", "AVAILABLE").with_tags(&[
            ("keep", "1"),
            ("drop", "2"),
            ("change", "old"),
            ("aws:cloudformation:stack-id", "x"),
        ]);
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live.clone()))
            .with_update(Ok(live.arn.clone()));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[
            ("keep", Some("1")),
            ("change", Some("new")),
            ("added", Some("3")),
        ]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.status, OperationStatus::InProgress);
        assert!(event.callback_context.unwrap().stabilizing);
        assert_eq!(api.calls(), vec!["get", "untag", "tag", "update"]);

        let untagged = api.untagged.borrow();
        assert_eq!(untagged[0].0, live.arn);
        assert_eq!(untagged[0].1, vec!["drop".to_string()]);

        let tagged = api.tagged.borrow();
        let expected = Tags::from([
            ("added".to_string(), Some("3".to_string())),
            ("change".to_string(), Some("new".to_string())),
        ]);
        assert_eq!(tagged[0].1, expected);
    }

    #[test]
    fn test_submit_skips_tag_calls_when_unchanged() {
        let live = environment("env", "AVAILABLE").with_tags(&[("team", "data")]);
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live.clone()))
            .with_update(Ok(live.arn.clone()));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[("team", Some("data"))]);
        Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(api.calls(), vec!["get", "update"]);
    }

    #[test]
    fn test_system_and_stack_tags_are_merged() {
        let live = environment("env", "AVAILABLE");
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live.clone()))
            .with_update(Ok(live.arn.clone()));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let mut request = request_with_tags(&[("team", Some("model"))]);
        request.system_tags = Tags::from([
            ("aws:cloudformation:logical-id".to_string(), Some("Env".to_string())),
            ("team".to_string(), Some("system".to_string())),
        ]);
        request.desired_resource_tags = Tags::from([("cost".to_string(), Some("42".to_string()))]);

        Operation::Update.handle(&ctx, &request, CallbackContext::default());

        let tagged = api.tagged.borrow();
        assert_eq!(
            tagged[0].1,
            Tags::from([
                ("cost".to_string(), Some("42".to_string())),
                ("team".to_string(), Some("model".to_string())),
            ])
        );
    }

    #[test]
    fn test_missing_environment_is_not_found() {
        let api = MockEnvironmentApi::new().with_get(Err(ApiError::NotFound("gone".into())));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.error_code, Some(HandlerErrorCode::NotFound));
        assert_eq!(api.call_count("update"), 0);
    }

    #[test]
    fn test_vanished_during_update_is_not_updatable() {
        let api = MockEnvironmentApi::new()
            .with_get(Ok(environment("env", "AVAILABLE")))
            .with_update(Err(ApiError::NotFound("gone".into())));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.error_code, Some(HandlerErrorCode::NotUpdatable));
    }

    #[test]
    fn test_validation_error_is_invalid_request() {
        let api = MockEnvironmentApi::new()
            .with_get(Ok(environment("env", "AVAILABLE")))
            .with_update(Err(ApiError::Validation(
                "MaxWorkers must be >= MinWorkers".into(),
            )));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        assert_eq!(
            event.message.as_deref(),
            Some("Invalid request provided: MaxWorkers must be >= MinWorkers")
        );
        assert_eq!(api.call_count("update"), 1);
    }

    #[test]
    fn test_untag_not_found_is_not_updatable() {
        let live = environment("env", "AVAILABLE").with_tags(&[("stale", "1")]);
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live))
            .with_tag_result(Err(ApiError::NotFound("gone".into())));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.status, OperationStatus::Failed);
        assert_eq!(event.error_code, Some(HandlerErrorCode::NotUpdatable));
        assert_eq!(api.calls(), vec!["get", "untag"]);
    }

    #[test]
    fn test_tag_validation_error_is_invalid_request() {
        let api = MockEnvironmentApi::new()
            .with_get(Ok(environment("env", "AVAILABLE")))
            .with_tag_result(Err(ApiError::Validation("Tag value too long".into())));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);

        let request = request_with_tags(&[("team", Some("data"))]);
        let event = Operation::Update.handle(&ctx, &request, CallbackContext::default());

        assert_eq!(event.error_code, Some(HandlerErrorCode::InvalidRequest));
        assert_eq!(
            event.message.as_deref(),
            Some("Invalid request provided: Tag value too long")
        );
        assert_eq!(api.calls(), vec!["get", "tag"]);
    }

    #[test]
    fn test_polling_never_resubmits() {
        let live = environment("env", "AVAILABLE");
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live.clone()))
            .with_get(Ok(environment("env", "UPDATING")))
            .with_get(Ok(environment("env", "UPDATING")))
            .with_get(Ok(environment("env", "UPDATING")))
            .with_get(Ok(live.clone()))
            .with_get(Ok(live.clone()))
            .with_update(Ok(live.arn.clone()));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);
        let request = request_with_tags(&[]);

        let mut event = Operation::Update.handle(&ctx, &request, CallbackContext::default());
        let mut invocations = 1;
        while let Some(token) = event.callback_context.clone() {
            event = Operation::Update.handle(&ctx, &request, token);
            invocations += 1;
        }

        assert!(event.is_success());
        assert_eq!(invocations, 5);
        assert_eq!(api.call_count("update"), 1);
    }

    #[test]
    fn test_update_failed_surfaces_transition_error() {
        let live = environment("env", "AVAILABLE");
        let api = MockEnvironmentApi::new()
            .with_get(Ok(live.clone()))
            .with_get(Ok(environment("env", "UPDATE_FAILED")))
            .with_get(Ok(environment("env", "UPDATE_FAILED").with_last_error("X")))
            .with_update(Ok(live.arn.clone()));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);
        let request = request_with_tags(&[]);

        let submitted = Operation::Update.handle(&ctx, &request, CallbackContext::default());
        assert_eq!(submitted.status, OperationStatus::InProgress);

        let token = submitted.callback_context.unwrap();
        let event = Operation::Update.handle(&ctx, &request, token);

        assert_eq!(event.status, OperationStatus::Failed);
        assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
        assert_eq!(event.message.as_deref(), Some("Update failed. X"));
    }

    #[test]
    fn test_unavailable_and_vanished() {
        let api = MockEnvironmentApi::new()
            .with_get(Ok(environment("env", "UNAVAILABLE")))
            .with_get(Ok(environment("env", "UNAVAILABLE").with_last_error("scheduler down")))
            .with_get(Err(ApiError::NotFound("gone".into())));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);
        let request = request_with_tags(&[]);

        let event = Operation::Update.handle(&ctx, &request, stabilizing());
        assert_eq!(
            event.message.as_deref(),
            Some("Update failed, Environment unavailable. scheduler down")
        );

        let event = Operation::Update.handle(&ctx, &request, stabilizing());
        assert_eq!(event.error_code, Some(HandlerErrorCode::NotStabilized));
        assert_eq!(
            event.message.as_deref(),
            Some("Update failed, resource no longer exists")
        );
    }

    #[test]
    fn test_stabilize_until_available() {
        let available = environment("env", "AVAILABLE").with_tags(&[("team", "data")]);
        let api = MockEnvironmentApi::new()
            .with_get(Ok(environment("env", "UPDATING")))
            .with_get(Ok(available));
        let options = HandlerOptions::default();
        let ctx = HandlerContext::with_sleeper(&api, &options, &NoSleep);
        let request = request_with_tags(&[]);

        let event = Operation::Update.handle(&ctx, &request, stabilizing());
        assert_eq!(event.status, OperationStatus::InProgress);
        assert_eq!(event.callback_delay_seconds, 60);
        let token = event.callback_context.unwrap();
        assert_eq!(token.polls, 1);

        let event = Operation::Update.handle(&ctx, &request, token);
        assert!(event.is_success());
        let model = event.resource_model.unwrap();
        assert_eq!(model.tags.unwrap().get("team"), Some(&Some("data".to_string())));
    }
}
