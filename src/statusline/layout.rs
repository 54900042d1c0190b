use std::sync::OnceLock;

use regex::Regex;

/// Width budget for one render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub width: usize,
    /// Extra columns reserved for double-width glyphs counted as one.
    pub glyph_buffer: usize,
    /// Leading spaces on the wrapped second line.
    pub wrap_indent: usize,
}

fn escape_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("valid escape pattern")
    })
}

/// Remove ANSI CSI sequences (colors, resets).
pub fn strip_escapes(s: &str) -> std::borrow::Cow<'_, str> {
    escape_pattern().replace_all(s, "")
}

/// Visible length in characters, escape sequences excluded.
pub fn visible_len(s: &str) -> usize {
    strip_escapes(s).chars().count()
}

/// Join both groups on one line if they fit, otherwise put `secondary` on an
/// indented second line. A total exactly equal to the width still fits.
pub fn compose(primary: &str, secondary: &str, separator: &str, layout: &Layout) -> String {
    if secondary.is_empty() {
        return primary.to_string();
    }
    if primary.is_empty() {
        return secondary.to_string();
    }

    let needed =
        visible_len(primary) + visible_len(separator) + visible_len(secondary) + layout.glyph_buffer;

    if needed <= layout.width {
        format!("{}{}{}", primary, separator, secondary)
    } else {
        format!("{}\n{}{}", primary, " ".repeat(layout.wrap_indent), secondary)
    }
}
