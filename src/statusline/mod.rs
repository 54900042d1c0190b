//! Snapshot in, status line out.
//!
//! parse -> derive -> classify -> render segments -> lay out. Everything here
//! is pure; collaborator results arrive pre-resolved in [`Environment`].

pub mod layout;
pub mod metrics;
pub mod segments;
pub mod snapshot;
pub mod theme;
pub mod tier;

use crate::platform::Environment;

use layout::Layout;
use metrics::{CostStrategy, DerivedMetrics, MetricInputs, TimerStrategy};
use snapshot::MetricsSnapshot;
use theme::{Role, Theme};

/// Knobs for one render, already merged from flags and config.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub cost: CostStrategy,
    pub timer: TimerStrategy,
    pub default_width: u16,
    pub glyph_buffer: usize,
    pub wrap_indent: usize,
}

/// Render one snapshot. Same snapshot and environment give the same bytes.
pub fn render(
    snapshot: &MetricsSnapshot,
    env: &Environment,
    theme: &Theme,
    options: &RenderOptions,
) -> String {
    let derived = DerivedMetrics::compute(
        snapshot,
        &MetricInputs {
            cost: options.cost,
            timer: options.timer,
            now: env.now,
            transcript_modified: env.transcript_modified,
        },
    );

    tracing::debug!(
        used_tokens = derived.used_tokens,
        cost = ?derived.cost,
        timer = ?derived.timer,
        "metrics derived"
    );

    let groups = segments::render_segments(snapshot, &derived, &env.git, theme);
    let separator = theme.separator();

    let layout = Layout {
        width: usize::from(env.columns.unwrap_or(options.default_width)),
        glyph_buffer: options.glyph_buffer,
        wrap_indent: options.wrap_indent,
    };

    layout::compose(
        &groups.primary.join(&separator),
        &groups.secondary.join(&separator),
        &separator,
        &layout,
    )
}

/// Fixed line shown when the snapshot itself is unusable.
pub fn degraded(theme: &Theme) -> String {
    let dir = match theme.glyphs().directory {
        "" => "~",
        glyph => glyph,
    };
    format!(
        "{} {} {}",
        theme.paint(dir, Role::Directory),
        theme.paint("Claude", Role::Neutral),
        theme.paint("(invalid data)", Role::Critical)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::GitStatus;
    use chrono::{DateTime, Utc};

    fn options() -> RenderOptions {
        RenderOptions {
            cost: CostStrategy::Auto,
            timer: TimerStrategy::Session,
            default_width: 80,
            glyph_buffer: 2,
            wrap_indent: 2,
        }
    }

    fn env(columns: Option<u16>) -> Environment {
        Environment {
            git: GitStatus::default(),
            columns,
            now: DateTime::<Utc>::from_timestamp(1_736_935_200, 0).unwrap(),
            transcript_modified: None,
        }
    }

    fn example_snapshot() -> MetricsSnapshot {
        snapshot::parse(
            br#"{
                "workspace": {"current_dir": "/home/u/proj"},
                "model": {"display_name": "Claude Opus"},
                "cost": {"total_cost_usd": 0.05},
                "context_window": {
                    "current_usage": {"input_tokens": 400, "cache_creation_input_tokens": 0, "cache_read_input_tokens": 0, "output_tokens": 100},
                    "context_window_size": 1000
                },
                "turn_count": 2
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let theme = Theme::new(false, false);
        let line = render(&example_snapshot(), &env(Some(200)), &theme, &options());
        assert_eq!(
            line,
            "proj | Claude Opus | ctx! 0.5K/1.0K(50.0%) | tpt 0.2K/turn | :) $0.05"
        );
    }

    #[test]
    fn test_end_to_end_unicode_segments() {
        let line = render(&example_snapshot(), &env(Some(200)), &Theme::plain(), &options());
        assert!(line.starts_with("\u{1F4C1} proj"));
        assert!(line.contains("\u{26A0} 0.5K/1.0K(50.0%)"));
        assert!(line.contains("0.2K/turn"));
        assert!(line.contains("\u{1F642} $0.05"));
    }

    #[test]
    fn test_zero_window_has_no_context_segment() {
        let mut snap = example_snapshot();
        snap.context_window_size = 0;
        let line = render(&snap, &env(Some(200)), &Theme::plain(), &options());
        assert!(!line.contains('%'), "unexpected context segment: {}", line);
    }

    #[test]
    fn test_render_is_deterministic() {
        let snap = example_snapshot();
        let theme = Theme::new(true, true);
        let a = render(&snap, &env(Some(40)), &theme, &options());
        let b = render(&snap, &env(Some(40)), &theme, &options());
        assert_eq!(a, b);
    }

    #[test]
    fn test_wraps_on_narrow_terminal() {
        let theme = Theme::new(false, false);
        let line = render(&example_snapshot(), &env(Some(30)), &theme, &options());
        let lines: Vec<&str> = line.lines().collect();
        assert_eq!(lines.len(), 2, "expected wrap: {:?}", lines);
        assert_eq!(lines[0], "proj | Claude Opus | ctx! 0.5K/1.0K(50.0%)");
        assert_eq!(lines[1], "  tpt 0.2K/turn | :) $0.05");
    }

    #[test]
    fn test_unknown_width_uses_default() {
        let theme = Theme::new(false, false);
        let mut opts = options();
        opts.default_width = 30;
        let line = render(&example_snapshot(), &env(None), &theme, &opts);
        assert!(line.contains('\n'));

        opts.default_width = 200;
        let line = render(&example_snapshot(), &env(None), &theme, &opts);
        assert!(!line.contains('\n'));
    }

    #[test]
    fn test_git_segment_in_primary_group() {
        let theme = Theme::new(false, false);
        let mut e = env(Some(200));
        e.git = GitStatus {
            is_repository: true,
            branch: "main".into(),
            is_detached: false,
            is_dirty: true,
        };
        let line = render(&example_snapshot(), &e, &theme, &options());
        assert!(line.starts_with("proj | [main*] | Claude Opus"), "{}", line);
    }

    #[test]
    fn test_degraded_line() {
        assert_eq!(degraded(&Theme::new(false, false)), "~ Claude (invalid data)");
        assert_eq!(degraded(&Theme::plain()), "\u{1F4C1} Claude (invalid data)");
    }
}
