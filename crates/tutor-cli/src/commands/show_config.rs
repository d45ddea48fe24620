//! `tutor config` — print the configuration in effect.

use anyhow::Result;
use tutor_core::config::Config;

/// Print `cfg` (file values with CLI overrides applied) as JSON.
pub fn run(cfg: &Config) -> Result<()> {
    println!("{}", cfg.to_json()?);
    Ok(())
}
