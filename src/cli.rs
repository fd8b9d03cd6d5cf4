//! Command-line surface: argument parsing and dispatch to the handlers.

use crate::api::ApiClient;
use crate::error::TalksError;
use crate::ui;
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::io::Write;

/// List and submit talks on the COSI talks registry.
#[derive(Parser, Debug)]
#[command(name = "talks-cli", version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print visible talks
    #[command(long_about = "Prints any talk in the talks database that has the hidden flag off")]
    Talks(ListArgs),
    /// Create new talk
    #[command(
        long_about = "Creates a new talk with three following arguments of name, type, and description. \
                      Do note talk submission is only allowed on COSI's subnets"
    )]
    New(NewArgs),
}

#[derive(Args, Debug, Default)]
pub struct ListArgs {
    /// Type of a talk. Leave empty to display all
    #[arg(short = 't', long = "type", default_value = "", allow_hyphen_values = true)]
    pub kind: String,

    #[arg(hide = true)]
    pub extra: Vec<String>,
}

#[derive(Args, Debug, Default)]
pub struct NewArgs {
    /// The presenter of the talk
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub name: String,

    /// Type of a talk
    #[arg(short = 't', long = "type", default_value = "", allow_hyphen_values = true)]
    pub kind: String,

    /// Description of a talk
    #[arg(short, long, default_value = "", allow_hyphen_values = true)]
    pub desc: String,

    #[arg(hide = true)]
    pub extra: Vec<String>,
}

/// Run one parsed invocation. With no subcommand the help banner is
/// written to `out`.
pub fn run<W: Write>(cli: Cli, api: &ApiClient, out: &mut W) -> Result<(), TalksError> {
    match cli.command {
        Some(Commands::Talks(args)) => ui::list_talks(api, &args.kind, out),
        Some(Commands::New(args)) => ui::submit_talk(api, &args, out),
        None => {
            write!(out, "{}", Cli::command().render_help())?;
            Ok(())
        }
    }
}
