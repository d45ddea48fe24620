//! `tutor recommend` — practice cards for the weakest skills.

use anyhow::{Context, Result};
use tutor_core::config::Config;
use tutor_core::mastery::{Difficulty, MasteryEstimator};
use tutor_core::ranker::RankRequest;
use tutor_core::session::SessionState;
use tutor_core::tutor::Tutor;

/// Command-line filters for a recommendation run.
#[derive(Debug, Default)]
pub struct Options<'a> {
    pub subject: Option<&'a str>,
    pub difficulty: Option<&'a str>,
    pub top_k: Option<usize>,
    pub scores: Option<&'a str>,
    pub json: bool,
}

/// Build the rank request from config and flags. "All Subjects" and "Any"
/// mean no filter.
pub fn build_request(cfg: &Config, opts: &Options<'_>) -> Result<RankRequest> {
    let mut request = RankRequest::new(opts.top_k.unwrap_or(cfg.recommend.top_k))
        .with_thresholds(cfg.mastery.thresholds)
        .with_default_mastery(cfg.mastery.default_mastery);

    if let Some(subject) = opts.subject.filter(|s| !s.eq_ignore_ascii_case("all subjects")) {
        request = request.with_subject(subject);
    }
    if let Some(difficulty) = opts.difficulty.filter(|d| !d.eq_ignore_ascii_case("any")) {
        let difficulty: Difficulty = difficulty.parse()?;
        request = request.with_difficulty(difficulty);
    }
    Ok(request)
}

/// Print ranked practice cards.
pub fn run(tutor: &mut Tutor, cfg: &Config, opts: Options<'_>) -> Result<()> {
    let request = build_request(cfg, &opts)?;
    let estimates = match opts.scores {
        Some(path) => super::estimate::load_estimates(cfg, path)?,
        None => MasteryEstimator::new(cfg.mastery.default_mastery).uniform(),
    };

    let mut state = SessionState::new();
    let cards = state.recommend(tutor, &estimates, &request);

    if opts.json {
        let out = serde_json::to_string_pretty(&cards).context("failed to serialize recommendations")?;
        println!("{out}");
        return Ok(());
    }

    if cards.is_empty() {
        println!("No recommendations found.");
        return Ok(());
    }

    for card in &cards {
        println!("### {} [{}]", card.title, card.difficulty);
        println!("Skill: {} (mastery {:.2})\n", card.skill, card.estimated_mastery);
        println!("{}\n\n---", card.excerpt);
    }
    Ok(())
}
