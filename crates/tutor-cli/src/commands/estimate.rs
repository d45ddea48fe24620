//! `tutor estimate` — mastery per skill from a JSON score table.
//!
//! A table that cannot be parsed yields the default mastery for every
//! skill rather than an error.

use anyhow::{Context, Result};
use tutor_core::config::Config;
use tutor_core::mastery::{MasteryEstimator, SkillEstimates};

/// Read a score table and return estimates for every catalog skill.
pub fn load_estimates(cfg: &Config, path: &str) -> Result<SkillEstimates> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read score table at {path}"))?;
    let estimator = MasteryEstimator::new(cfg.mastery.default_mastery);
    Ok(estimator.estimate_from_table(&content))
}

/// Print estimates as a table or JSON.
pub fn run(cfg: &Config, path: &str, json: bool) -> Result<()> {
    let estimates = load_estimates(cfg, path)?;

    if json {
        let out = serde_json::to_string_pretty(&estimates).context("failed to serialize estimates")?;
        println!("{out}");
        return Ok(());
    }

    println!("{:<24} {:<8} {}", "SKILL", "MASTERY", "DIFFICULTY");
    for (skill, mastery) in estimates.iter() {
        let difficulty = cfg.mastery.thresholds.classify(mastery);
        println!("{skill:<24} {mastery:<8.2} {difficulty}");
    }
    Ok(())
}
