//! # Scenario 2: Building a Study Plan from Scores
//!
//! **Actor**: Student with a term's worth of quiz results
//! **Goal**: Turn raw scores into mastery estimates and a ranked set of
//! practice cards for the weakest skills
//!
//! Demonstrates:
//! - Estimating mastery from a JSON score table (mixed 0-1 and 0-100 scales)
//! - A table with an unreadable score falling back to defaults everywhere
//! - Weak-skill summary through the tutor
//! - Ranked recommendations with subject and difficulty filters
//! - Recommendations that never repeat a question across runs

use tutor_core::mastery::{Difficulty, HistoryRow, MasteryEstimator, MasteryThresholds};
use tutor_core::ranker::RankRequest;
use tutor_core::session::SessionState;
use tutor_core::tutor::{Tutor, TutorContext};

const SCORES: &str = r#"[
  {"student_id": "s-17", "skill": "fractions", "score": 40},
  {"student_id": "s-17", "skill": "fractions", "score": 0.2},
  {"student_id": "s-17", "skill": "genetics", "score": 0.5},
  {"student_id": "s-17", "skill": "motion", "score": 88},
  {"student_id": "s-17", "skill": "algebra"},
  {"student_id": "s-17", "skill": "origami", "score": 0.1}
]"#;

fn sep(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("  {title}");
    println!("{}\n", "=".repeat(60));
}

fn main() {
    println!("==========================================================");
    println!("  SCENARIO 2: Building a Study Plan from Scores");
    println!("==========================================================\n");

    let estimator = MasteryEstimator::default();
    let thresholds = MasteryThresholds::default();

    // ── Estimate ─────────────────────────────────────────────────
    sep("Mastery estimates");
    let estimates = estimator.estimate_from_table(SCORES);
    for (skill, mastery) in estimates.weakest(6) {
        println!("  {skill:<20} {mastery:.2}  {}", thresholds.classify(mastery));
    }
    println!("\n  (origami is not in the catalog and is ignored; the algebra row has no score and counts as the default)");

    let broken = SCORES.replace("88", "\"eighty-eight\"");
    let fallback = estimator.estimate_from_table(&broken);
    println!(
        "  with an unreadable score every skill falls back: fractions {:.2}",
        fallback.get("fractions").unwrap_or_default()
    );

    let history = vec![HistoryRow::new("optics", 0.9), HistoryRow::new("optics", 0.7)];
    let from_history = estimator.estimate_from_history(&history);
    println!("  optics from history: {:.2}", from_history.get("optics").unwrap_or_default());

    // ── Ask the tutor ────────────────────────────────────────────
    sep("What should I work on?");
    let mut tutor = Tutor::seeded(99);
    let context = TutorContext::new().with_estimates(estimates.clone());
    let reply = tutor.respond("Where am I weakest?", &context);
    println!("  {}", reply.text);

    // ── Recommend ────────────────────────────────────────────────
    let mut state = SessionState::new();

    sep("Top 3 overall");
    let cards = state.recommend(&mut tutor, &estimates, &RankRequest::new(3));
    for card in &cards {
        println!("  ### {} [{}]", card.title, card.difficulty);
        println!("  mastery {:.2}", card.estimated_mastery);
        for line in card.excerpt.lines().skip(1) {
            println!("  {line}");
        }
        println!();
    }

    sep("Easy Mathematics only, asked twice");
    let request = RankRequest::new(2)
        .with_subject("Mathematics")
        .with_difficulty(Difficulty::Easy);
    for round in 1..=2 {
        for card in state.recommend(&mut tutor, &estimates, &request) {
            println!("  round {round}: {}", card.excerpt.replace('\n', " | "));
        }
    }
    println!(
        "\n  fractions questions remembered: {}",
        state.given_problems.used("Mathematics|fractions").len()
    );
}
