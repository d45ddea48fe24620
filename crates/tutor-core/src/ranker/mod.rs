//! Practice recommendations, weakest skills first.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::allocator::AllocatorMemory;
use crate::catalog;
use crate::mastery::{Difficulty, MasteryThresholds, SkillEstimates, DEFAULT_MASTERY};
use crate::tutor::{PracticeGenerator, PracticeRequest};

/// One recommended practice item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationCard {
    pub id: String,
    pub skill: String,
    pub estimated_mastery: f64,
    pub difficulty: Difficulty,
    pub title: String,
    pub excerpt: String,
}

/// Filters and limits for [`rank`].
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub top_k: usize,
    pub subject_filter: Option<String>,
    pub difficulty_filter: Option<Difficulty>,
    pub thresholds: MasteryThresholds,
    /// Used for every catalog skill when no estimates are given.
    pub default_mastery: f64,
}

impl Default for RankRequest {
    fn default() -> Self {
        Self::new(5)
    }
}

impl RankRequest {
    pub fn new(top_k: usize) -> Self {
        Self {
            top_k,
            subject_filter: None,
            difficulty_filter: None,
            thresholds: MasteryThresholds::default(),
            default_mastery: DEFAULT_MASTERY,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject_filter = Some(subject.into());
        self
    }

    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.difficulty_filter = Some(difficulty);
        self
    }

    pub fn with_thresholds(mut self, thresholds: MasteryThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_default_mastery(mut self, mastery: f64) -> Self {
        self.default_mastery = mastery;
        self
    }
}

fn practice_prompt(skill: &str, mastery: f64) -> String {
    format!(
        "Generate a practice exercise for skill '{skill}'. \
         The student's mastery is {mastery:.2}. \
         Provide ONLY:\n- one question\n- one short hint\n\
         Do NOT give the solution. Do NOT add explanation."
    )
}

/// Rank skills by ascending mastery and build up to `top_k` practice cards.
///
/// Allocator memory is threaded through every generator call, so no two
/// cards for the same skill repeat a question, and the final memory is
/// returned for the caller to keep.
pub fn rank<G: PracticeGenerator + ?Sized>(
    estimates: &SkillEstimates,
    generator: &mut G,
    request: &RankRequest,
    mut memory: AllocatorMemory,
) -> (Vec<RecommendationCard>, AllocatorMemory) {
    let mut cards = Vec::new();
    if request.top_k == 0 {
        return (cards, memory);
    }

    let fallback;
    let estimates = if estimates.is_empty() {
        fallback = SkillEstimates::uniform(catalog::all_skills(), request.default_mastery);
        &fallback
    } else {
        estimates
    };

    let allowed = request.subject_filter.as_deref().map(catalog::skills_of);

    for (skill, mastery) in estimates.ascending() {
        if let Some(allowed) = allowed {
            if !allowed.iter().any(|s| *s == skill) {
                continue;
            }
        }

        let mastery = if mastery.is_finite() {
            mastery
        } else {
            request.default_mastery
        };
        let difficulty = request.thresholds.classify(mastery);
        if request.difficulty_filter.is_some_and(|d| d != difficulty) {
            continue;
        }

        let practice = PracticeRequest {
            prompt: practice_prompt(skill, mastery),
            skill: skill.to_string(),
            difficulty: Some(difficulty),
        };
        let (text, next) = generator.generate_practice(&practice, memory);
        memory = next;

        let title = text
            .lines()
            .next()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Practice: {skill}"));

        cards.push(RecommendationCard {
            id: crate::new_id(),
            skill: skill.to_string(),
            estimated_mastery: mastery,
            difficulty,
            title,
            excerpt: text,
        });

        if cards.len() >= request.top_k {
            break;
        }
    }

    debug!(cards = cards.len(), "recommendations ranked");
    (cards, memory)
}
