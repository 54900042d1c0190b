use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use colored::Colorize;

use crate::config;

/// Arguments for the `config` subcommand.
#[derive(ClapArgs)]
pub struct Args {
    /// Print the built-in defaults instead of the loaded file
    #[arg(long)]
    pub defaults: bool,
}

/// Print the effective configuration as TOML on stdout and where it was
/// loaded from on stderr.
pub fn run(args: Args) -> Result<()> {
    let path = config::config_path();

    let effective = if args.defaults {
        config::StatuslineConfig::default()
    } else {
        config::load()
    };

    match &path {
        Some(p) if p.exists() && !args.defaults => {
            eprintln!("{} {}", "config:".bold(), p.display());
        }
        Some(p) => {
            eprintln!(
                "{} {} {}",
                "config:".bold(),
                p.display(),
                "(not found, using defaults)".dimmed()
            );
        }
        None => {
            eprintln!("{} {}", "config:".bold(), "no config directory, using defaults".dimmed());
        }
    }

    let text = toml::to_string_pretty(&effective).context("failed to serialize config")?;
    print!("{}", text);
    Ok(())
}
