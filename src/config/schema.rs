use serde::{Deserialize, Serialize};

use crate::statusline::metrics::{CostStrategy, TimerStrategy};

/// User-configurable statusline settings.
/// Missing file is not an error -- all fields have defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatuslineConfig {
    /// Width used when no terminal size can be detected.
    /// Default: 80
    pub default_width: u16,

    /// Spaces before the wrapped second line.
    /// Default: 2
    pub wrap_indent: usize,

    /// Columns reserved for emoji that render two cells wide.
    /// Default: 2
    pub glyph_buffer: usize,

    /// Cost source: "auto", "direct" or "price-table".
    pub cost: CostStrategy,

    /// Timer segment: "session" or "reset".
    pub timer: TimerStrategy,

    /// Probe git for branch and dirty state.
    /// Default: true
    pub git: bool,

    /// Give up on git after this many milliseconds.
    /// Default: 300
    pub git_timeout_ms: u64,

    /// Give up waiting for the snapshot after this many milliseconds.
    /// Default: 1000
    pub stdin_timeout_ms: u64,

    /// Stop reading stdin after this many bytes.
    /// Default: 65536
    pub max_input_bytes: u64,
}

impl Default for StatuslineConfig {
    fn default() -> Self {
        Self {
            default_width: 80,
            wrap_indent: 2,
            glyph_buffer: 2,
            cost: CostStrategy::Auto,
            timer: TimerStrategy::Session,
            git: true,
            git_timeout_ms: 300,
            stdin_timeout_ms: 1000,
            max_input_bytes: 65536,
        }
    }
}
