pub mod schema;

use std::path::{Path, PathBuf};

pub use schema::StatuslineConfig;

/// Env var that points at an alternate config file (used by tests).
pub const CONFIG_ENV: &str = "CC_STATUSLINE_CONFIG";

/// Where the config file is read from: `CC_STATUSLINE_CONFIG` first, then
/// `~/.config/cc-statusline/config.toml` (platform-appropriate).
pub fn config_path() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV)
        .ok()
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| dirs::config_dir().map(|d| d.join("cc-statusline").join("config.toml")))
}

/// Load the statusline config.
/// Returns defaults if the file is missing or unparseable; a render must
/// never fail because of configuration.
pub fn load() -> StatuslineConfig {
    match config_path() {
        Some(path) => load_from(&path),
        None => StatuslineConfig::default(),
    }
}

pub fn load_from(path: &Path) -> StatuslineConfig {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return StatuslineConfig::default(),
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unparseable config");
            StatuslineConfig::default()
        }
    }
}
