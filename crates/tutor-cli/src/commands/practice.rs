//! `tutor practice` — non-repeating practice questions for one skill.

use anyhow::{bail, Result};
use tutor_core::catalog;
use tutor_core::session::SessionState;
use tutor_core::tutor::Tutor;

/// Print `count` practice questions for `skill`.
pub fn run(tutor: &mut Tutor, skill: &str, count: usize) -> Result<()> {
    if count == 0 {
        bail!("count must be at least 1");
    }
    if catalog::subject_of(skill).is_none() {
        tracing::warn!(skill, "skill is not in the catalog, using generic practice");
    }

    let mut state = SessionState::new();
    for i in 0..count {
        if i > 0 {
            println!();
        }
        println!("{}", state.practice_skill(tutor, skill));
    }
    Ok(())
}
