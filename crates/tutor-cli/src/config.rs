//! Configuration file at `~/.tutor/config.toml`.
//!
//! Uses the core [`Config`] layout. A path ending in `.json` is read as JSON
//! instead of TOML. CLI flags always override file values.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;
use tutor_core::config::Config;

/// `~/.tutor/config.toml`, or a relative fallback without a home directory.
pub fn default_path() -> String {
    let home = dirs::home_dir().unwrap_or_default();
    home.join(".tutor")
        .join("config.toml")
        .to_string_lossy()
        .to_string()
}

/// Load configuration from a TOML file, returning defaults if the file
/// does not exist.
pub fn load(path: &str) -> Result<Config> {
    let path = Path::new(path);
    if !path.exists() {
        debug!(path = %path.display(), "config file not found, using defaults");
        return Ok(Config::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config at {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let parsed = if is_json {
        parse_json(&content)
    } else {
        parse(&content)
    };
    let config =
        parsed.with_context(|| format!("failed to parse config at {}", path.display()))?;

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Parse and validate TOML configuration text.
pub fn parse(content: &str) -> Result<Config> {
    let config: Config = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Parse and validate JSON configuration text.
pub fn parse_json(content: &str) -> Result<Config> {
    let config = Config::from_json(content)?;
    config.validate()?;
    Ok(config)
}
