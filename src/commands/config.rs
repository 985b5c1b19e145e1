use anyhow::{Context as _, Result};

use crate::Context;
use crate::cli::ConfigCommand;
use crate::config::Config;
use crate::{paths, state, ui};

pub fn run(_ctx: &Context, cmd: ConfigCommand) -> Result<()> {
    match cmd {
        ConfigCommand::Show => show(),
        ConfigCommand::Init { force } => init(force),
        ConfigCommand::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load()?;

    ui::header("Configuration");
    ui::kv("Config file", &path.display().to_string());
    if !path.exists() {
        ui::dim("Not found, using defaults. Run 'mwaa-env config init' to create it.");
    }
    ui::kv(
        "State file",
        &paths::state_dir()?.join(state::FILE_NAME).display().to_string(),
    );

    println!();
    let content = toml::to_string_pretty(&config).context("Failed to serialize config")?;
    print!("{content}");

    Ok(())
}

fn init(force: bool) -> Result<()> {
    let path = Config::path()?;

    if path.exists() && !force {
        ui::warn(&format!(
            "Config already exists at {} (use --force to overwrite)",
            path.display()
        ));
        return Ok(());
    }

    Config::default().save_to(&path)?;
    ui::success(&format!("Wrote default config to {}", path.display()));
    Ok(())
}
