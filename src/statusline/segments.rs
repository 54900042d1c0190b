use std::path::Path;

use super::metrics::{format_countdown, format_duration, format_kilo, DerivedMetrics, Timer};
use super::snapshot::MetricsSnapshot;
use super::theme::{Role, Theme};
use super::tier::ModelFamily;
use crate::platform::GitStatus;

/// Rendered segments split at the two-line fallback point.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SegmentGroups {
    /// Where am I: directory, git, vim mode, model, context.
    pub primary: Vec<String>,
    /// How is it going: cache, tokens/turn, session, style, lines, cost, timer.
    pub secondary: Vec<String>,
}

pub fn render_segments(
    snapshot: &MetricsSnapshot,
    derived: &DerivedMetrics,
    git: &GitStatus,
    theme: &Theme,
) -> SegmentGroups {
    let primary = [
        Some(directory(&snapshot.working_directory, theme)),
        branch(git, theme),
        vim_mode(snapshot, theme),
        model(snapshot, theme),
        context(derived, theme),
    ];

    let secondary = [
        cache(derived, theme),
        tokens_per_turn(derived, theme),
        session(derived, theme),
        output_style(snapshot, theme),
        lines_changed(snapshot, theme),
        cost(derived, theme),
        reset_timer(derived, theme),
    ];

    SegmentGroups {
        primary: primary.into_iter().flatten().collect(),
        secondary: secondary.into_iter().flatten().collect(),
    }
}

/// Glyph and text joined by a space, or just the text when the glyph is empty.
fn labeled(glyph: &str, text: &str) -> String {
    if glyph.is_empty() {
        text.to_string()
    } else {
        format!("{} {}", glyph, text)
    }
}

/// Last path component, `/` for the root, `~` when nothing was supplied.
pub fn directory_label(dir: &str) -> String {
    if dir.is_empty() {
        return "~".to_string();
    }
    match Path::new(dir).file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None if dir.starts_with('/') => "/".to_string(),
        None => dir.to_string(),
    }
}

fn directory(dir: &str, theme: &Theme) -> String {
    let label = labeled(theme.glyphs().directory, &directory_label(dir));
    theme.paint(&label, Role::Directory)
}

fn branch(git: &GitStatus, theme: &Theme) -> Option<String> {
    if !git.is_repository || git.branch.is_empty() {
        return None;
    }
    let name = if git.is_detached {
        format!(":{}", git.branch)
    } else {
        git.branch.clone()
    };
    let mut out = format!("[{}", theme.paint(&name, Role::Branch));
    if git.is_dirty {
        out.push_str(&theme.paint(theme.glyphs().dirty, Role::Dirty));
    }
    out.push(']');
    Some(out)
}

fn vim_mode(snapshot: &MetricsSnapshot, theme: &Theme) -> Option<String> {
    let (glyph, label, role) = theme.vim_style(snapshot.vim_mode)?;
    Some(format!("[{}]", theme.paint(&labeled(glyph, label), role)))
}

fn model(snapshot: &MetricsSnapshot, theme: &Theme) -> Option<String> {
    let name = snapshot.model_display_name.as_str();
    if name.is_empty() {
        return None;
    }
    let family = match ModelFamily::classify(name) {
        ModelFamily::Other => ModelFamily::classify(&snapshot.model_id),
        family => family,
    };
    Some(theme.paint(name, theme.model_role(family)))
}

fn context(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    let ctx = derived.context?;
    let (glyph, role) = theme.context_style(ctx.tier());
    let text = format!(
        "{}/{}({}%)",
        format_kilo(ctx.used),
        format_kilo(ctx.window),
        ctx.percent_display()
    );
    Some(theme.paint(&labeled(glyph, &text), role))
}

fn cache(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    if derived.cache_percent == 0 {
        return None;
    }
    let text = format!("{}%", derived.cache_percent);
    Some(theme.paint(&labeled(theme.glyphs().cache, &text), Role::Accent))
}

fn tokens_per_turn(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    let value = derived.tokens_per_turn.as_deref()?;
    let text = format!("{}K/turn", value);
    Some(theme.paint(&labeled(theme.glyphs().tokens_per_turn, &text), Role::Accent))
}

fn session(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    match derived.timer? {
        Timer::Session(secs) => {
            let text = labeled(theme.glyphs().session, &format_duration(secs));
            Some(theme.paint(&text, Role::Neutral))
        }
        Timer::Reset(_) => None,
    }
}

fn output_style(snapshot: &MetricsSnapshot, theme: &Theme) -> Option<String> {
    let name = snapshot.output_style_name.as_str();
    if name.is_empty() || name == "default" {
        return None;
    }
    Some(theme.paint(&labeled(theme.glyphs().style, name), Role::Dim))
}

fn lines_changed(snapshot: &MetricsSnapshot, theme: &Theme) -> Option<String> {
    if snapshot.lines_added == 0 && snapshot.lines_removed == 0 {
        return None;
    }
    Some(format!(
        "{}/{}",
        theme.paint(&format!("+{}", snapshot.lines_added), Role::Added),
        theme.paint(&format!("-{}", snapshot.lines_removed), Role::Removed)
    ))
}

fn cost(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    let cost = derived.cost?;
    let tier = cost.tier()?;
    let (glyph, role) = theme.cost_style(tier);
    Some(format!("{} {}", glyph, theme.paint(&cost.display(), role)))
}

fn reset_timer(derived: &DerivedMetrics, theme: &Theme) -> Option<String> {
    match derived.timer? {
        Timer::Reset(secs) => {
            let text = labeled(theme.glyphs().reset, &format_countdown(secs));
            Some(theme.paint(&text, Role::Warning))
        }
        Timer::Session(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statusline::metrics::{ContextUsage, Cost};
    use crate::statusline::snapshot::VimMode;

    fn derived() -> DerivedMetrics {
        DerivedMetrics {
            used_tokens: 0,
            context: None,
            cache_percent: 0,
            tokens_per_turn: None,
            cost: None,
            timer: None,
        }
    }

    fn git(branch: &str, detached: bool, dirty: bool) -> GitStatus {
        GitStatus {
            is_repository: true,
            branch: branch.into(),
            is_detached: detached,
            is_dirty: dirty,
        }
    }

    #[test]
    fn test_directory_label() {
        assert_eq!(directory_label("/home/u/proj"), "proj");
        assert_eq!(directory_label("/home/u/proj/"), "proj");
        assert_eq!(directory_label("/"), "/");
        assert_eq!(directory_label(""), "~");
        assert_eq!(directory_label("relative"), "relative");
    }

    #[test]
    fn test_branch_segment() {
        let theme = Theme::plain();
        assert_eq!(branch(&git("main", false, false), &theme).unwrap(), "[main]");
        assert_eq!(
            branch(&git("main", false, true), &theme).unwrap(),
            "[main\u{25CF}]"
        );
    }

    #[test]
    fn test_detached_branch_uses_colon_hash() {
        let theme = Theme::plain();
        let seg = branch(&git("abc1234", true, false), &theme).unwrap();
        assert_eq!(seg, "[:abc1234]");
    }

    #[test]
    fn test_branch_absent_outside_repository() {
        let theme = Theme::plain();
        assert!(branch(&GitStatus::default(), &theme).is_none());
        assert!(branch(&git("", false, false), &theme).is_none());
    }

    #[test]
    fn test_vim_segment() {
        let theme = Theme::new(false, false);
        let snap = MetricsSnapshot {
            vim_mode: VimMode::Normal,
            ..Default::default()
        };
        assert_eq!(vim_mode(&snap, &theme).unwrap(), "[N NORMAL]");
        assert!(vim_mode(&MetricsSnapshot::default(), &theme).is_none());
    }

    #[test]
    fn test_context_segment_text() {
        let theme = Theme::new(false, false);
        let d = DerivedMetrics {
            context: Some(ContextUsage {
                used: 500,
                window: 1000,
            }),
            ..derived()
        };
        assert_eq!(context(&d, &theme).unwrap(), "ctx! 0.5K/1.0K(50.0%)");
    }

    #[test]
    fn test_cache_segment_only_when_positive() {
        let theme = Theme::new(false, false);
        assert!(cache(&derived(), &theme).is_none());
        let d = DerivedMetrics {
            cache_percent: 80,
            ..derived()
        };
        assert_eq!(cache(&d, &theme).unwrap(), "cache 80%");
    }

    #[test]
    fn test_output_style_hidden_when_default() {
        let theme = Theme::new(false, false);
        assert!(output_style(&MetricsSnapshot::default(), &theme).is_none());
        let snap = MetricsSnapshot {
            output_style_name: "Learning".into(),
            ..Default::default()
        };
        assert_eq!(output_style(&snap, &theme).unwrap(), "style Learning");
    }

    #[test]
    fn test_lines_changed() {
        let theme = Theme::plain();
        assert!(lines_changed(&MetricsSnapshot::default(), &theme).is_none());
        let snap = MetricsSnapshot {
            lines_added: 12,
            lines_removed: 0,
            ..Default::default()
        };
        assert_eq!(lines_changed(&snap, &theme).unwrap(), "+12/-0");
    }

    #[test]
    fn test_cost_segment_suppressed_at_floor() {
        let theme = Theme::new(false, false);
        let at_floor = DerivedMetrics {
            cost: Some(Cost::Usd(0.001)),
            ..derived()
        };
        assert!(cost(&at_floor, &theme).is_none());

        let above = DerivedMetrics {
            cost: Some(Cost::Usd(0.05)),
            ..derived()
        };
        assert_eq!(cost(&above, &theme).unwrap(), ":) $0.05");

        let extreme = DerivedMetrics {
            cost: Some(Cost::Cents(1500)),
            ..derived()
        };
        assert_eq!(cost(&extreme, &theme).unwrap(), "!! $15.00");
    }

    #[test]
    fn test_timer_segments_are_exclusive() {
        let theme = Theme::new(false, false);
        let running = DerivedMetrics {
            timer: Some(Timer::Session(3661)),
            ..derived()
        };
        assert_eq!(session(&running, &theme).unwrap(), "up 1h1m");
        assert!(reset_timer(&running, &theme).is_none());

        let countdown = DerivedMetrics {
            timer: Some(Timer::Reset(1800)),
            ..derived()
        };
        assert!(session(&countdown, &theme).is_none());
        assert_eq!(reset_timer(&countdown, &theme).unwrap(), "reset 0h30m");
    }

    #[test]
    fn test_groups_skip_absent_segments() {
        let theme = Theme::plain();
        let groups = render_segments(
            &MetricsSnapshot::default(),
            &derived(),
            &GitStatus::default(),
            &theme,
        );
        assert_eq!(groups.primary, vec!["\u{1F4C1} ~".to_string(), "Claude".to_string()]);
        assert!(groups.secondary.is_empty());
    }

    #[test]
    fn test_model_color_falls_back_to_model_id() {
        let snap = MetricsSnapshot {
            model_display_name: "Claude".into(),
            model_id: "claude-opus-4-1".into(),
            ..Default::default()
        };
        // plain theme: only the text is observable
        assert_eq!(model(&snap, &Theme::plain()).unwrap(), "Claude");
    }
}
