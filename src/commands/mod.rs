pub mod config;
pub mod invoke;
pub mod run;

use anyhow::{Context as _, Result};
use reconcile::{HandlerRequest, ResourceModel};
use std::fs;
use std::io::{self, Read};
use std::path::Path;

use crate::cli::RequestArgs;
use crate::config::Config;
use crate::local::LocalProvider;

/// Build the handler request from `--request`, `--name` and `--next-token`
pub fn load_request(args: &RequestArgs) -> Result<HandlerRequest> {
    let mut request = match (&args.request, &args.name) {
        (Some(path), _) => parse_json::<HandlerRequest>(&read_input(path)?)
            .with_context(|| format!("Invalid request document: {}", path.display()))?,
        (None, Some(name)) => HandlerRequest::for_model(ResourceModel::named(name.clone())),
        (None, None) => HandlerRequest::default(),
    };

    if args.next_token.is_some() {
        request.next_token.clone_from(&args.next_token);
    }

    Ok(request)
}

/// Read a file, or stdin for `-`
pub fn read_input(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin()
            .read_to_string(&mut content)
            .context("Failed to read stdin")?;
        return Ok(content);
    }

    fs::read_to_string(path).with_context(|| format!("Could not read {}", path.display()))
}

pub fn parse_json<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    serde_json::from_str(content).context("Invalid JSON")
}

/// Open the local provider configured by `config`
pub fn provider(config: &Config) -> Result<LocalProvider> {
    LocalProvider::open(config.local.settle_polls, &config.handler.reserved_tag_prefix)
}
