//! Closed severity levels derived from continuous metrics.

/// How full the context window is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ContextTier {
    Normal,
    Caution,
    Critical,
}

impl ContextTier {
    /// `< 50%` normal, `< 80%` caution, otherwise critical.
    ///
    /// Compared on integers so that exactly 50% lands in `Caution`.
    pub fn classify(used: u64, window: u64) -> Self {
        let used_scaled = u128::from(used) * 100;
        let window = u128::from(window);
        if used_scaled < window * 50 {
            ContextTier::Normal
        } else if used_scaled < window * 80 {
            ContextTier::Caution
        } else {
            ContextTier::Critical
        }
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Spend bands in USD. Costs at or below a tenth of a cent have no tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum CostTier {
    Trivial,
    Low,
    Moderate,
    High,
    Extreme,
}

const COST_FLOOR_USD: f64 = 0.001;

impl CostTier {
    pub fn classify(usd: f64) -> Option<Self> {
        if !usd.is_finite() || usd <= COST_FLOOR_USD {
            return None;
        }
        let tier = if usd < 0.10 {
            CostTier::Trivial
        } else if usd < 0.50 {
            CostTier::Low
        } else if usd < 1.00 {
            CostTier::Moderate
        } else if usd < 5.00 {
            CostTier::High
        } else {
            CostTier::Extreme
        };
        Some(tier)
    }

    pub fn level(self) -> u8 {
        self as u8
    }
}

/// Model family, used only to pick a display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFamily {
    Opus,
    Sonnet,
    Haiku,
    Other,
}

impl ModelFamily {
    pub fn classify(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("opus") {
            ModelFamily::Opus
        } else if name.contains("sonnet") {
            ModelFamily::Sonnet
        } else if name.contains("haiku") {
            ModelFamily::Haiku
        } else {
            ModelFamily::Other
        }
    }
}
