use colored::Colorize;

use super::snapshot::VimMode;
use super::tier::{ContextTier, CostTier, ModelFamily};

/// Semantic color slots. Rendering code only ever names a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Directory,
    Branch,
    Dirty,
    Accent,
    Neutral,
    Dim,
    Good,
    Warning,
    Critical,
    Opus,
    Sonnet,
    Haiku,
    Added,
    Removed,
    CostWarm,
    CostHot,
    VimInsert,
    VimNormal,
    VimVisual,
}

/// Glyph set for one rendering mode.
#[derive(Debug, Clone, Copy)]
pub struct Glyphs {
    pub directory: &'static str,
    pub dirty: &'static str,
    pub separator: &'static str,
    pub cache: &'static str,
    pub tokens_per_turn: &'static str,
    pub session: &'static str,
    pub reset: &'static str,
    pub style: &'static str,
    pub context: [&'static str; 3],
    pub cost: [&'static str; 5],
    pub vim_insert: &'static str,
    pub vim_normal: &'static str,
    pub vim_visual: &'static str,
}

const UNICODE_GLYPHS: Glyphs = Glyphs {
    directory: "\u{1F4C1}",
    dirty: "\u{25CF}",
    separator: "\u{2502}",
    cache: "\u{267B}",
    tokens_per_turn: "\u{21BB}",
    session: "\u{23F1}",
    reset: "\u{23F3}",
    style: "\u{270E}",
    context: ["\u{1F9E0}", "\u{26A0}", "\u{1F6A8}"],
    cost: ["\u{1F642}", "\u{1F610}", "\u{1F61F}", "\u{1F630}", "\u{1F525}"],
    vim_insert: "\u{270F}",
    vim_normal: "\u{25C6}",
    vim_visual: "\u{25A3}",
};

const ASCII_GLYPHS: Glyphs = Glyphs {
    directory: "",
    dirty: "*",
    separator: "|",
    cache: "cache",
    tokens_per_turn: "tpt",
    session: "up",
    reset: "reset",
    style: "style",
    context: ["ctx", "ctx!", "ctx!!"],
    cost: [":)", ":|", ":/", ":(", "!!"],
    vim_insert: "I",
    vim_normal: "N",
    vim_visual: "V",
};

/// Immutable palette plus glyph set handed to the renderer.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    color: bool,
    glyphs: &'static Glyphs,
}

impl Theme {
    pub fn new(color: bool, unicode: bool) -> Self {
        Self {
            color,
            glyphs: if unicode {
                &UNICODE_GLYPHS
            } else {
                &ASCII_GLYPHS
            },
        }
    }

    /// No color, Unicode glyphs. What the unit tests assert against.
    #[cfg(test)]
    pub fn plain() -> Self {
        Self::new(false, true)
    }

    pub fn glyphs(&self) -> &Glyphs {
        self.glyphs
    }

    /// Wrap `text` in the escape sequences for `role`.
    pub fn paint(&self, text: &str, role: Role) -> String {
        if !self.color || text.is_empty() {
            return text.to_string();
        }
        let styled = match role {
            Role::Directory => text.bright_blue().bold(),
            Role::Branch => text.magenta(),
            Role::Dirty => text.bright_red(),
            Role::Accent => text.bright_cyan(),
            Role::Neutral => text.white(),
            Role::Dim => text.dimmed(),
            Role::Good => text.green(),
            Role::Warning => text.yellow(),
            Role::Critical => text.bright_red().bold(),
            Role::Opus => text.bright_magenta(),
            Role::Sonnet => text.bright_blue(),
            Role::Haiku => text.bright_green(),
            Role::Added => text.green(),
            Role::Removed => text.red(),
            Role::CostWarm => text.yellow(),
            Role::CostHot => text.truecolor(255, 135, 0),
            Role::VimInsert => text.green().bold(),
            Role::VimNormal => text.blue().bold(),
            Role::VimVisual => text.magenta().bold(),
        };
        styled.to_string()
    }

    /// Separator between segments, padded and dimmed.
    pub fn separator(&self) -> String {
        format!(" {} ", self.paint(self.glyphs.separator, Role::Dim))
    }

    pub fn context_style(&self, tier: ContextTier) -> (&'static str, Role) {
        let glyph = self.glyphs.context[tier.level() as usize];
        let role = match tier {
            ContextTier::Normal => Role::Good,
            ContextTier::Caution => Role::Warning,
            ContextTier::Critical => Role::Critical,
        };
        (glyph, role)
    }

    pub fn cost_style(&self, tier: CostTier) -> (&'static str, Role) {
        let glyph = self.glyphs.cost[tier.level() as usize];
        let role = match tier {
            CostTier::Trivial | CostTier::Low | CostTier::Moderate => Role::CostWarm,
            CostTier::High | CostTier::Extreme => Role::CostHot,
        };
        (glyph, role)
    }

    pub fn model_role(&self, family: ModelFamily) -> Role {
        match family {
            ModelFamily::Opus => Role::Opus,
            ModelFamily::Sonnet => Role::Sonnet,
            ModelFamily::Haiku => Role::Haiku,
            ModelFamily::Other => Role::Neutral,
        }
    }

    /// Glyph, label and color for a vim mode; `None` renders nothing.
    pub fn vim_style(&self, mode: VimMode) -> Option<(&'static str, &'static str, Role)> {
        match mode {
            VimMode::Insert => Some((self.glyphs.vim_insert, "INSERT", Role::VimInsert)),
            VimMode::Normal => Some((self.glyphs.vim_normal, "NORMAL", Role::VimNormal)),
            VimMode::Visual => Some((self.glyphs.vim_visual, "VISUAL", Role::VimVisual)),
            VimMode::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_theme_does_not_color() {
        let theme = Theme::plain();
        assert_eq!(theme.paint("main", Role::Branch), "main");
    }

    #[test]
    fn test_ascii_glyphs_are_ascii() {
        let g = &ASCII_GLYPHS;
        let all = [
            g.directory,
            g.dirty,
            g.separator,
            g.cache,
            g.tokens_per_turn,
            g.session,
            g.reset,
            g.style,
            g.vim_insert,
            g.vim_normal,
            g.vim_visual,
        ];
        for glyph in all.iter().chain(g.context.iter()).chain(g.cost.iter()) {
            assert!(glyph.is_ascii(), "non-ascii glyph {:?}", glyph);
        }
    }

    #[test]
    fn test_context_styles_are_distinct() {
        let theme = Theme::plain();
        let tiers = [ContextTier::Normal, ContextTier::Caution, ContextTier::Critical];
        let roles: Vec<Role> = tiers.iter().map(|t| theme.context_style(*t).1).collect();
        assert_ne!(roles[0], roles[1]);
        assert_ne!(roles[1], roles[2]);
        assert_ne!(roles[0], roles[2]);
    }

    #[test]
    fn test_extreme_cost_glyph_is_distinct() {
        let theme = Theme::plain();
        let extreme = theme.cost_style(CostTier::Extreme).0;
        for tier in [CostTier::Trivial, CostTier::Low, CostTier::Moderate, CostTier::High] {
            assert_ne!(theme.cost_style(tier).0, extreme);
        }
    }

    #[test]
    fn test_vim_style_none_for_unset_mode() {
        let theme = Theme::plain();
        assert!(theme.vim_style(VimMode::None).is_none());
        assert_eq!(theme.vim_style(VimMode::Insert).unwrap().1, "INSERT");
    }
}
