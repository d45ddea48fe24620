//! `tutor skills` — print the skill catalog.

use anyhow::{bail, Result};
use tutor_core::catalog;

/// List every subject with its skills, or just one subject's skills.
pub fn run(subject: Option<&str>) -> Result<()> {
    match subject {
        Some(subject) => {
            let skills = catalog::skills_of(subject);
            if skills.is_empty() {
                bail!(
                    "unknown subject '{subject}' (known: {})",
                    catalog::subjects().join(", ")
                );
            }
            for skill in skills {
                println!("{skill}");
            }
        }
        None => {
            for subject in catalog::subjects() {
                println!("{subject}: {}", catalog::skills_of(subject).join(", "));
            }
        }
    }
    Ok(())
}
