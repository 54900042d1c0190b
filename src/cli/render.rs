use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tokio::io::AsyncReadExt;

use crate::config::{self, StatuslineConfig};
use crate::error::StatuslineError;
use crate::platform::{self, Capabilities};
use crate::statusline::metrics::{CostStrategy, TimerStrategy};
use crate::statusline::theme::Theme;
use crate::statusline::{self, snapshot, RenderOptions};

// ---------------------------------------------------------------------------
// Clap Args
// ---------------------------------------------------------------------------

/// Arguments for rendering the status line (the default action).
#[derive(ClapArgs, Debug, Clone, Default)]
pub struct Args {
    /// Disable colored output (also respects NO_COLOR env var)
    #[arg(long)]
    pub no_color: bool,

    /// Use ASCII-only characters (no Unicode symbols)
    #[arg(long)]
    pub no_unicode: bool,

    /// Override terminal width (default: detected, then config, then 80)
    #[arg(long)]
    pub width: Option<u16>,

    /// Where the cost figure comes from
    #[arg(long, value_enum)]
    pub cost: Option<CostStrategy>,

    /// Show session duration or the 24h reset countdown
    #[arg(long, value_enum)]
    pub timer: Option<TimerStrategy>,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Entry point. Wraps `run_inner` in `catch_unwind` so that panics and
/// unusable input still print a placeholder and the process exits 0.
pub fn run(args: Args) -> Result<()> {
    // Claude Code pipes stdout (not a TTY), so colored would normally
    // disable colors. Force them on unless --no-color or NO_COLOR is set.
    let color = !(args.no_color || std::env::var_os("NO_COLOR").is_some());
    colored::control::set_override(color);
    let theme = Theme::new(color, !args.no_unicode);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run_inner(&args, &theme)));

    let line = match result {
        Ok(Ok(line)) => line,
        Ok(Err(e)) => {
            tracing::warn!(error = %format!("{:#}", e), "rendering degraded placeholder");
            statusline::degraded(&theme)
        }
        Err(_) => {
            tracing::warn!("render panicked; rendering degraded placeholder");
            statusline::degraded(&theme)
        }
    };

    println!("{}", line);
    Ok(())
}

fn run_inner(args: &Args, theme: &Theme) -> Result<String> {
    let config = config::load();
    let options = render_options(args, &config);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let caps = Capabilities::system(Duration::from_millis(config.git_timeout_ms));
    let probed = runtime.block_on(async {
        let input = read_stdin(
            config.max_input_bytes,
            Duration::from_millis(config.stdin_timeout_ms),
        )
        .await?;
        let snapshot = snapshot::parse(&input)?;
        tracing::debug!(session = ?snapshot.session_id, model = %snapshot.model_display_name, "snapshot parsed");
        let mut env = platform::gather(&snapshot, &caps, config.git).await;
        if args.width.is_some() {
            env.columns = args.width;
        }
        Ok::<_, StatuslineError>((snapshot, env))
    });

    // A stalled stdin reader must not keep the process alive.
    runtime.shutdown_background();

    let (snapshot, env) = probed?;
    Ok(statusline::render(&snapshot, &env, theme, &options))
}

/// Merge flags over config. Flags win.
fn render_options(args: &Args, config: &StatuslineConfig) -> RenderOptions {
    RenderOptions {
        cost: args.cost.unwrap_or(config.cost),
        timer: args.timer.unwrap_or(config.timer),
        default_width: config.default_width,
        glyph_buffer: config.glyph_buffer,
        wrap_indent: config.wrap_indent,
    }
}

// ---------------------------------------------------------------------------
// Stdin
// ---------------------------------------------------------------------------

/// Read the snapshot from stdin, capped at `limit` bytes and `timeout`.
async fn read_stdin(limit: u64, timeout: Duration) -> Result<Vec<u8>, StatuslineError> {
    let mut buf = Vec::with_capacity(8192);
    let mut stdin = tokio::io::stdin().take(limit);
    let read = stdin.read_to_end(&mut buf);
    let outcome = tokio::time::timeout(timeout, read).await;

    match outcome {
        Ok(Ok(n)) => {
            if n as u64 >= limit {
                tracing::warn!(
                    max_input_bytes = limit,
                    "stdin reached max_input_bytes; snapshot truncated"
                );
            }
            tracing::debug!(bytes = n, "snapshot read");
            Ok(buf)
        }
        Ok(Err(e)) => Err(StatuslineError::MissingCapability(format!(
            "stdin unreadable: {}",
            e
        ))),
        Err(_) => Err(StatuslineError::MissingCapability(
            "timed out waiting for stdin".to_string(),
        )),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
