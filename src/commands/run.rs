use anyhow::{Result, bail};
use reconcile::{HandlerContext, OperationStatus, ProgressEvent, drive};
use std::time::{Duration, Instant};

use super::{load_request, provider};
use crate::Context;
use crate::cli::RunArgs;
use crate::config::Config;
use crate::ui;

pub fn run(ctx: &Context, args: RunArgs) -> Result<()> {
    let config = Config::load()?;
    let request = load_request(&args.request)?;
    let operation = args.request.operation;

    let api = provider(&config)?;
    let options = config.handler_options();
    let handler_ctx = HandlerContext::new(&api, &options);

    if !ctx.quiet {
        ui::header(&format!("{operation} {}", target(&request)));
    }

    let mut invocation = 0;
    let events = drive(
        operation,
        &handler_ctx,
        &request,
        args.max_invocations,
        |delay, event| {
            invocation += 1;
            if !ctx.quiet {
                ui::step(invocation, &describe(event));
            }
            if !args.no_wait {
                wait(delay, ctx.quiet);
            }
        },
    )?;

    let Some(last) = events.last() else {
        bail!("{operation} produced no result");
    };

    if ctx.verbose > 0 {
        println!("{}", serde_json::to_string_pretty(last)?);
    }

    match last.status {
        OperationStatus::Success => {
            ui::success(&format!(
                "{operation} succeeded after {} invocation(s)",
                events.len()
            ));
            print_result(last);
            Ok(())
        }
        _ => {
            let code = last
                .error_code
                .map(|c| c.to_string())
                .unwrap_or_default();
            bail!(
                "{operation} failed ({code}): {}",
                last.message.as_deref().unwrap_or("no message")
            )
        }
    }
}

fn target(request: &reconcile::HandlerRequest) -> String {
    request
        .desired_resource_state
        .as_ref()
        .map_or_else(|| reconcile::TYPE_NAME.to_string(), |m| m.name.clone())
}

fn describe(event: &ProgressEvent) -> String {
    let polls = event.callback_context.as_ref().map_or(0, |c| c.polls);
    if polls == 0 {
        "Submitted".to_string()
    } else {
        format!("Still in progress (poll {polls})")
    }
}

/// Wait out the callback delay behind a spinner
fn wait(delay: Duration, quiet: bool) {
    if quiet {
        std::thread::sleep(delay);
        return;
    }

    let pb = ui::spinner("Waiting");
    let start = Instant::now();
    while let Some(remaining) = delay.checked_sub(start.elapsed()) {
        pb.set_message(format!("Calling back in {}", ui::format_wait(remaining)));
        std::thread::sleep(remaining.min(Duration::from_millis(250)));
        if remaining.is_zero() {
            break;
        }
    }
    pb.finish_and_clear();
}

fn print_result(event: &ProgressEvent) {
    if let Some(model) = &event.resource_model {
        ui::kv("Name", &model.name);
        if let Some(arn) = &model.arn {
            ui::kv("Arn", arn);
        }
        if let Some(url) = &model.webserver_url {
            ui::kv("Webserver", url);
        }
        if let Some(tags) = model.tags.as_ref().filter(|t| !t.is_empty()) {
            ui::kv("Tags", &reconcile::tags::format_tags(tags));
        }
    }

    if let Some(models) = &event.resource_models {
        if models.is_empty() {
            ui::dim("No environments");
        }
        for model in models {
            ui::info(&model.name);
        }
        if let Some(token) = &event.next_token {
            ui::dim(&format!("More results: --next-token {token}"));
        }
    }
}
