use std::sync::OnceLock;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::snapshot::{MetricsSnapshot, SessionStart};
use super::tier::{ContextTier, CostTier};

/// Length of the rolling usage window the reset timer counts down.
const RESET_WINDOW_SECS: i64 = 86_400;

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// Where the session cost comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum CostStrategy {
    /// Direct cost if the snapshot has one, otherwise the price table.
    #[default]
    Auto,
    /// Only the snapshot's `total_cost_usd`.
    Direct,
    /// Only raw token totals priced per model.
    PriceTable,
}

/// Which clock the timer segment shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TimerStrategy {
    /// Time elapsed since the session started.
    #[default]
    Session,
    /// Time left in the rolling 24h usage window.
    Reset,
}

// ---------------------------------------------------------------------------
// Derived values
// ---------------------------------------------------------------------------

/// Context window occupancy. Only exists when the window size is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextUsage {
    pub used: u64,
    pub window: u64,
}

impl ContextUsage {
    pub fn tier(&self) -> ContextTier {
        ContextTier::classify(self.used, self.window)
    }

    /// Percentage with one decimal, truncated (e.g. "50.0").
    pub fn percent_display(&self) -> String {
        let per_mille = u128::from(self.used) * 1000 / u128::from(self.window);
        format!("{}.{}", per_mille / 10, per_mille % 10)
    }
}

/// A session cost, either as reported or computed in whole cents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cost {
    Usd(f64),
    Cents(u64),
}

impl Cost {
    pub fn usd(&self) -> f64 {
        match *self {
            Cost::Usd(usd) => usd,
            Cost::Cents(cents) => cents as f64 / 100.0,
        }
    }

    pub fn tier(&self) -> Option<CostTier> {
        CostTier::classify(self.usd())
    }

    /// Whole cents, truncated. The epsilon absorbs binary representation
    /// error so 0.29 stays 29 cents.
    pub fn cents(&self) -> u64 {
        match *self {
            Cost::Usd(usd) if usd.is_finite() && usd > 0.0 => (usd * 100.0 + 1e-6).floor() as u64,
            Cost::Usd(_) => 0,
            Cost::Cents(cents) => cents,
        }
    }

    /// Dollar amount with two decimals, truncated to the cent, e.g. "$0.05".
    pub fn display(&self) -> String {
        let cents = self.cents();
        format!("${}.{:02}", cents / 100, cents % 100)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timer {
    Session(u64),
    Reset(u64),
}

/// Everything the segment renderer needs that is not read straight off the
/// snapshot. Recomputed on every render.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedMetrics {
    pub used_tokens: u64,
    pub context: Option<ContextUsage>,
    pub cache_percent: u64,
    /// Thousands of tokens per turn, one decimal. `None` when suppressed.
    pub tokens_per_turn: Option<String>,
    pub cost: Option<Cost>,
    pub timer: Option<Timer>,
}

/// Inputs to [`DerivedMetrics::compute`] that come from outside the snapshot.
#[derive(Debug, Clone, Copy)]
pub struct MetricInputs {
    pub cost: CostStrategy,
    pub timer: TimerStrategy,
    pub now: DateTime<Utc>,
    pub transcript_modified: Option<DateTime<Utc>>,
}

impl DerivedMetrics {
    pub fn compute(snapshot: &MetricsSnapshot, inputs: &MetricInputs) -> Self {
        let usage = snapshot.current_usage.unwrap_or_default();
        let used_tokens = usage
            .input_tokens
            .saturating_add(usage.cache_creation_tokens)
            .saturating_add(usage.cache_read_tokens)
            .saturating_add(usage.output_tokens);

        let context = (snapshot.context_window_size > 0).then_some(ContextUsage {
            used: used_tokens,
            window: snapshot.context_window_size,
        });

        let cache_percent = cache_percent(
            usage.input_tokens,
            usage.cache_creation_tokens,
            usage.cache_read_tokens,
        );

        Self {
            used_tokens,
            context,
            cache_percent,
            tokens_per_turn: tokens_per_turn(used_tokens, snapshot.turn_count),
            cost: resolve_cost(snapshot, inputs.cost),
            timer: resolve_timer(snapshot, inputs),
        }
    }
}

// ---------------------------------------------------------------------------
// Calculations
// ---------------------------------------------------------------------------

/// Share of prompt tokens served from cache, truncated to a whole percent.
pub fn cache_percent(input: u64, cache_creation: u64, cache_read: u64) -> u64 {
    let denominator = u128::from(input) + u128::from(cache_creation) + u128::from(cache_read);
    if denominator == 0 {
        return 0;
    }
    (u128::from(cache_read) * 100 / denominator) as u64
}

/// Tokens per turn in thousands, one decimal, truncated.
/// `None` when there are no turns or the value rounds down to zero.
pub fn tokens_per_turn(used_tokens: u64, turn_count: u64) -> Option<String> {
    if turn_count == 0 {
        return None;
    }
    let tenths = used_tokens / turn_count / 100;
    if tenths == 0 {
        return None;
    }
    Some(format!("{}.{}", tenths / 10, tenths % 10))
}

/// "K" notation: one decimal below 10K, whole thousands above.
pub fn format_kilo(tokens: u64) -> String {
    if tokens < 10_000 {
        let tenths = tokens / 100;
        format!("{}.{}K", tenths / 10, tenths % 10)
    } else {
        format!("{}K", tokens / 1000)
    }
}

/// Price per million tokens, in cents, for input and output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricePair {
    pub input_cents: u64,
    pub output_cents: u64,
}

const OPUS: PricePair = PricePair {
    input_cents: 1500,
    output_cents: 7500,
};
const SONNET: PricePair = PricePair {
    input_cents: 300,
    output_cents: 1500,
};
const HAIKU: PricePair = PricePair {
    input_cents: 25,
    output_cents: 125,
};

/// Matched against the lowercased model id, first hit wins.
const PRICE_TABLE: &[(&str, PricePair)] = &[
    ("opus-4", OPUS),
    ("sonnet-4", SONNET),
    ("opus", OPUS),
    ("sonnet", SONNET),
    ("haiku", HAIKU),
];

pub fn price_for(model_id: &str) -> PricePair {
    let id = model_id.to_lowercase();
    PRICE_TABLE
        .iter()
        .find(|(needle, _)| id.contains(needle))
        .map(|(_, price)| *price)
        .unwrap_or(SONNET)
}

/// Cost of the given token totals in whole cents. Each side is floored
/// separately before summing.
pub fn price_table_cents(model_id: &str, input_tokens: u64, output_tokens: u64) -> u64 {
    let price = price_for(model_id);
    let side = |tokens: u64, cents_per_million: u64| -> u128 {
        u128::from(tokens) * u128::from(cents_per_million) / 1_000_000
    };
    let total = side(input_tokens, price.input_cents) + side(output_tokens, price.output_cents);
    u64::try_from(total).unwrap_or(u64::MAX)
}

fn resolve_cost(snapshot: &MetricsSnapshot, strategy: CostStrategy) -> Option<Cost> {
    let direct = || snapshot.total_cost_usd.map(Cost::Usd);
    let table = || {
        if snapshot.total_input_tokens.is_none() && snapshot.total_output_tokens.is_none() {
            return None;
        }
        Some(Cost::Cents(price_table_cents(
            &snapshot.model_id,
            snapshot.total_input_tokens.unwrap_or(0),
            snapshot.total_output_tokens.unwrap_or(0),
        )))
    };

    match strategy {
        CostStrategy::Auto => direct().or_else(table),
        CostStrategy::Direct => direct(),
        CostStrategy::PriceTable => table(),
    }
}

// ---------------------------------------------------------------------------
// Time
// ---------------------------------------------------------------------------

fn timestamp_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2})(?:\.\d+)?(?:[Zz]|[+-]\d{2}:?\d{2})?$")
            .expect("valid timestamp pattern")
    })
}

/// Parse a loose ISO-8601 timestamp. Fractional seconds and any zone suffix
/// (`Z` or a numeric offset) are dropped and the remainder is read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let caps = timestamp_pattern().captures(raw.trim())?;
    let naive = NaiveDateTime::parse_from_str(&caps[1], "%Y-%m-%dT%H:%M:%S").ok()?;
    Some(Utc.from_utc_datetime(&naive))
}

fn explicit_start(snapshot: &MetricsSnapshot) -> Option<Option<DateTime<Utc>>> {
    snapshot.session_start.as_ref().map(|start| match start {
        SessionStart::Timestamp(raw) => parse_timestamp(raw),
        SessionStart::EpochSeconds(secs) => Utc.timestamp_opt(*secs, 0).single(),
    })
}

fn resolve_timer(snapshot: &MetricsSnapshot, inputs: &MetricInputs) -> Option<Timer> {
    match inputs.timer {
        TimerStrategy::Session => {
            // An explicit but unparseable start suppresses the segment rather
            // than falling back to the transcript.
            let start = match explicit_start(snapshot) {
                Some(parsed) => parsed?,
                None => inputs.transcript_modified?,
            };
            session_seconds(start, inputs.now).map(Timer::Session)
        }
        TimerStrategy::Reset => {
            let reference = inputs
                .transcript_modified
                .or_else(|| explicit_start(snapshot).flatten())?;
            Some(Timer::Reset(reset_countdown(reference, inputs.now)))
        }
    }
}

/// Whole seconds since `start`; `None` if zero or negative.
pub fn session_seconds(start: DateTime<Utc>, now: DateTime<Utc>) -> Option<u64> {
    let secs = (now - start).num_seconds();
    (secs > 0).then_some(secs as u64)
}

/// Seconds until the rolling 24h window anchored at `reference` resets.
pub fn reset_countdown(reference: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let elapsed = (now - reference).num_seconds();
    (RESET_WINDOW_SECS - elapsed.rem_euclid(RESET_WINDOW_SECS)) as u64
}

/// "1h1m", "5m", or "59s".
pub fn format_duration(seconds: u64) -> String {
    if seconds >= 3600 {
        format!("{}h{}m", seconds / 3600, (seconds % 3600) / 60)
    } else if seconds >= 60 {
        format!("{}m", seconds / 60)
    } else {
        format!("{}s", seconds)
    }
}

/// Always hours and minutes, e.g. "0h5m".
pub fn format_countdown(seconds: u64) -> String {
    format!("{}h{}m", seconds / 3600, (seconds % 3600) / 60)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
