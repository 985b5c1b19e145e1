use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use reconcile::Operation;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mwaa-env")]
#[command(version)]
#[command(about = "Drive managed workflow environments to their desired state", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a single handler invocation and print the progress event as JSON
    Invoke(InvokeArgs),

    /// Drive an operation until it succeeds or fails
    Run(RunArgs),

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Where the handler request comes from
#[derive(Args)]
pub struct RequestArgs {
    /// Operation: create, read, update, delete or list
    pub operation: Operation,

    /// Request document (JSON); `-` reads stdin
    #[arg(short, long, conflicts_with = "name")]
    pub request: Option<PathBuf>,

    /// Environment name, for a request without any other properties
    #[arg(short, long)]
    pub name: Option<String>,

    /// List pagination token
    #[arg(long)]
    pub next_token: Option<String>,
}

#[derive(Args)]
pub struct InvokeArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Continuation token (JSON) returned by the previous invocation
    #[arg(short, long)]
    pub token: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    #[command(flatten)]
    pub request: RequestArgs,

    /// Don't wait the requested callback delay between invocations
    #[arg(long)]
    pub no_wait: bool,

    /// Give up after this many invocations
    #[arg(long, default_value_t = reconcile::DEFAULT_MAX_INVOCATIONS)]
    pub max_invocations: u32,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration
    Show,

    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Print the config file path
    Path,
}
