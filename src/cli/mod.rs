pub mod config;
pub mod render;

use clap::{Parser, Subcommand};

/// Status line for coding-assistant sessions. Reads the session snapshot
/// as JSON on stdin and prints one (or two) formatted lines.
#[derive(Parser)]
#[command(name = "cc-statusline", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub render: render::Args,

    /// Logging verbosity for stderr: off, error, warn, info, debug.
    #[arg(long, global = true, env = "CC_STATUSLINE_LOG")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the effective configuration
    Config(config::Args),
}

/// Initialize tracing to stderr. Stdout belongs to the status line.
pub fn init_tracing(log_level: Option<&str>) {
    let filter = match log_level.unwrap_or("off") {
        "off" => "off",
        "error" => "error",
        "warn" => "warn",
        "info" => "info",
        "debug" => "debug",
        other => {
            eprintln!("warning: unknown log level '{}', logging disabled", other);
            "off"
        }
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
