use std::path::PathBuf;

use serde_json::Value;

use crate::error::StatuslineError;

// ---------------------------------------------------------------------------
// Field probes
// ---------------------------------------------------------------------------
//
// Each list is tried in order and the first usable value wins. Later entries
// cover older snapshot layouts (flat `cwd`, string `model`, top-level
// `cost_usd`/`context_tokens`/`context_window`).

const WORKING_DIRECTORY: &[&str] = &["/workspace/current_dir", "/cwd", "/workspace"];
const MODEL_DISPLAY_NAME: &[&str] = &["/model/display_name", "/model"];
const MODEL_ID: &[&str] = &["/model/id", "/model"];
const OUTPUT_STYLE: &[&str] = &["/output_style/name", "/output_style"];
const VIM_MODE: &[&str] = &["/vim/mode"];
const TOTAL_COST_USD: &[&str] = &["/cost/total_cost_usd", "/cost_usd"];
const LINES_ADDED: &[&str] = &["/cost/total_lines_added"];
const LINES_REMOVED: &[&str] = &["/cost/total_lines_removed"];
const CURRENT_USAGE: &[&str] = &["/context_window/current_usage"];
const LEGACY_CONTEXT_TOKENS: &[&str] = &["/context_tokens"];
const CONTEXT_WINDOW_SIZE: &[&str] = &["/context_window/context_window_size", "/context_window"];
const TOTAL_INPUT_TOKENS: &[&str] = &["/context_window/total_input_tokens"];
const TOTAL_OUTPUT_TOKENS: &[&str] = &["/context_window/total_output_tokens"];
const TURN_COUNT: &[&str] = &["/turn_count"];
const SESSION_START: &[&str] = &["/session_start_time", "/session/start_time", "/start_time"];
const SESSION_ID: &[&str] = &["/session_id"];
const TRANSCRIPT_PATH: &[&str] = &["/transcript_path"];

const DEFAULT_MODEL_NAME: &str = "Claude";
const DEFAULT_OUTPUT_STYLE: &str = "default";

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Editor mode reported by the host. Anything unrecognised is `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VimMode {
    #[default]
    None,
    Insert,
    Normal,
    Visual,
}

impl VimMode {
    /// Exact, case-sensitive match on the host's mode names.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "INSERT" => VimMode::Insert,
            "NORMAL" => VimMode::Normal,
            "VISUAL" => VimMode::Visual,
            _ => VimMode::None,
        }
    }
}

/// Tokens occupying the context window on the latest turn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentUsage {
    pub input_tokens: u64,
    pub cache_creation_tokens: u64,
    pub cache_read_tokens: u64,
    pub output_tokens: u64,
}

/// Raw session start as it appeared in the snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStart {
    Timestamp(String),
    EpochSeconds(i64),
}

/// Normalized view of one host snapshot. Built once per render.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub working_directory: String,
    pub model_display_name: String,
    pub model_id: String,
    pub output_style_name: String,
    pub vim_mode: VimMode,
    /// `None` when the snapshot carries no direct cost field at all.
    pub total_cost_usd: Option<f64>,
    pub total_input_tokens: Option<u64>,
    pub total_output_tokens: Option<u64>,
    pub lines_added: u64,
    pub lines_removed: u64,
    pub current_usage: Option<CurrentUsage>,
    /// 0 means unknown; every percentage against it is suppressed.
    pub context_window_size: u64,
    pub turn_count: u64,
    pub session_start: Option<SessionStart>,
    pub session_id: Option<String>,
    pub transcript_path: Option<PathBuf>,
}

impl Default for MetricsSnapshot {
    fn default() -> Self {
        Self {
            working_directory: String::new(),
            model_display_name: DEFAULT_MODEL_NAME.to_string(),
            model_id: String::new(),
            output_style_name: DEFAULT_OUTPUT_STYLE.to_string(),
            vim_mode: VimMode::None,
            total_cost_usd: None,
            total_input_tokens: None,
            total_output_tokens: None,
            lines_added: 0,
            lines_removed: 0,
            current_usage: None,
            context_window_size: 0,
            turn_count: 0,
            session_start: None,
            session_id: None,
            transcript_path: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Decode a raw stdin payload into a snapshot.
///
/// Individual missing fields fall back to defaults. Only an empty payload,
/// undecodable JSON, or a non-object top-level value is an error.
pub fn parse(input: &[u8]) -> Result<MetricsSnapshot, StatuslineError> {
    if input.iter().all(u8::is_ascii_whitespace) {
        return Err(StatuslineError::EmptyInput);
    }

    let root: Value = serde_json::from_slice(input)?;
    if !root.is_object() {
        return Err(StatuslineError::NotAnObject);
    }

    Ok(from_value(&root))
}

/// Build a snapshot from an already-decoded JSON object.
pub fn from_value(root: &Value) -> MetricsSnapshot {
    let current_usage = probe(root, CURRENT_USAGE)
        .filter(|v| v.is_object())
        .map(|usage| CurrentUsage {
            input_tokens: probe_u64(usage, &["/input_tokens"]).unwrap_or(0),
            cache_creation_tokens: probe_u64(usage, &["/cache_creation_input_tokens"])
                .unwrap_or(0),
            cache_read_tokens: probe_u64(usage, &["/cache_read_input_tokens"]).unwrap_or(0),
            output_tokens: probe_u64(usage, &["/output_tokens"]).unwrap_or(0),
        })
        .or_else(|| {
            probe_u64(root, LEGACY_CONTEXT_TOKENS).map(|tokens| CurrentUsage {
                input_tokens: tokens,
                ..Default::default()
            })
        });

    MetricsSnapshot {
        working_directory: probe_str(root, WORKING_DIRECTORY).unwrap_or_default(),
        model_display_name: probe_str(root, MODEL_DISPLAY_NAME)
            .unwrap_or_else(|| DEFAULT_MODEL_NAME.to_string()),
        model_id: probe_str(root, MODEL_ID).unwrap_or_default(),
        output_style_name: probe_str(root, OUTPUT_STYLE)
            .unwrap_or_else(|| DEFAULT_OUTPUT_STYLE.to_string()),
        vim_mode: probe_str(root, VIM_MODE)
            .map(|m| VimMode::parse(&m))
            .unwrap_or_default(),
        total_cost_usd: probe_f64(root, TOTAL_COST_USD),
        total_input_tokens: probe_u64(root, TOTAL_INPUT_TOKENS),
        total_output_tokens: probe_u64(root, TOTAL_OUTPUT_TOKENS),
        lines_added: probe_u64(root, LINES_ADDED).unwrap_or(0),
        lines_removed: probe_u64(root, LINES_REMOVED).unwrap_or(0),
        current_usage,
        context_window_size: probe_u64(root, CONTEXT_WINDOW_SIZE).unwrap_or(0),
        turn_count: probe_u64(root, TURN_COUNT).unwrap_or(0),
        session_start: probe_session_start(root),
        session_id: probe_str(root, SESSION_ID),
        transcript_path: probe_str(root, TRANSCRIPT_PATH).map(PathBuf::from),
    }
}

// ---------------------------------------------------------------------------
// Probe helpers
// ---------------------------------------------------------------------------

/// First value along `paths` that is present and not `null`.
fn probe<'a>(root: &'a Value, paths: &[&str]) -> Option<&'a Value> {
    paths
        .iter()
        .filter_map(|p| root.pointer(p))
        .find(|v| !v.is_null())
}

/// First non-empty string along `paths`. Non-string values are skipped.
fn probe_str(root: &Value, paths: &[&str]) -> Option<String> {
    paths
        .iter()
        .filter_map(|p| root.pointer(p))
        .filter_map(Value::as_str)
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// First numeric value along `paths`, as a decimal. Numeric strings count.
fn probe_f64(root: &Value, paths: &[&str]) -> Option<f64> {
    paths
        .iter()
        .filter_map(|p| root.pointer(p))
        .find_map(as_decimal)
}

/// First numeric value along `paths`, with the fractional part discarded.
/// Negative values clamp to zero.
fn probe_u64(root: &Value, paths: &[&str]) -> Option<u64> {
    paths
        .iter()
        .filter_map(|p| root.pointer(p))
        .find_map(as_count)
}

/// Integers stay exact; only fractional values go through `f64`.
fn as_count(value: &Value) -> Option<u64> {
    let exact = match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    exact.or_else(|| as_decimal(value).map(truncate_count))
}

fn as_decimal(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    n.is_finite().then_some(n)
}

fn truncate_count(n: f64) -> u64 {
    if n <= 0.0 {
        0
    } else {
        n.trunc() as u64
    }
}

fn probe_session_start(root: &Value) -> Option<SessionStart> {
    for path in SESSION_START {
        match root.pointer(path) {
            Some(Value::String(s)) if !s.trim().is_empty() => {
                return Some(SessionStart::Timestamp(s.trim().to_string()));
            }
            Some(Value::Number(n)) => {
                if let Some(secs) = n.as_f64().filter(|f| f.is_finite()) {
                    return Some(SessionStart::EpochSeconds(secs.trunc() as i64));
                }
            }
            _ => {}
        }
    }
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
