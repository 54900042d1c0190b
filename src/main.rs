mod cli;
mod config;
mod error;
mod platform;
mod statusline;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::init_tracing(cli.log_level.as_deref());

    match cli.command {
        Some(Command::Config(args)) => cli::config::run(args),
        None => cli::render::run(cli.render),
    }
}
