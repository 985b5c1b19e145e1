use anyhow::{Context as _, Result};
use reconcile::{CallbackContext, HandlerContext};

use super::{load_request, parse_json, provider, read_input};
use crate::Context;
use crate::cli::InvokeArgs;
use crate::config::Config;

pub fn run(_ctx: &Context, args: InvokeArgs) -> Result<()> {
    let config = Config::load()?;
    let request = load_request(&args.request)?;

    let token = match &args.token {
        Some(path) => parse_json::<CallbackContext>(&read_input(path)?)
            .with_context(|| format!("Invalid continuation token: {}", path.display()))?,
        None => CallbackContext::default(),
    };

    let api = provider(&config)?;
    let options = config.handler_options();
    let handler_ctx = HandlerContext::new(&api, &options);

    let event = args.request.operation.handle(&handler_ctx, &request, token);
    let json = serde_json::to_string_pretty(&event).context("Failed to serialize progress event")?;
    println!("{json}");

    Ok(())
}
