//! Rule-based response router.
//!
//! A [`Tutor`] classifies free text into an [`Intent`] and answers from the
//! static bank. Practice requests go through the non-repeating allocator.
//!
//! Calls that name a session (`TutorContext::with_session`) get a cache of
//! that session's memory and topic. The cache is only ever unioned with what
//! the caller supplies, and a reply carries nothing but its own session's
//! memory. Calls without a session id leave no state behind.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::allocator::{allocate, memory_key, AllocatorMemory, ProblemPool};
use crate::bank;
use crate::catalog;
use crate::config::TutorConfig;
use crate::mastery::{Difficulty, SkillEstimates};

pub const SET_TOPIC_PREFIX: &str = "start topic:";

const PRACTICE_TRIGGERS: &[&str] = &[
    "practice problem",
    "another problem",
    "practice exercise",
    "give me a basic problem",
];

const EXPLAIN_TRIGGERS: &[&str] = &[
    "explain",
    "define",
    "what is",
    "explain more",
    "show me the solution",
];

const SKILL_PRACTICE_TRIGGER: &str = "generate a practice";

pub const HELP_TEXT: &str =
    "I'm here to help! Start with 'Start topic: Subject|Topic' or ask for a practice problem.";

/// What an instruction asks for. Variants are listed in match precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SetTopic,
    Practice,
    Explanation,
    SkillPractice,
    WeakSkills,
    Fallback,
}

impl Intent {
    /// Classify an instruction. First match wins.
    pub fn classify(instruction: &str, has_estimates: bool) -> Self {
        let lower = instruction.trim().to_lowercase();
        if lower.starts_with(SET_TOPIC_PREFIX) {
            Intent::SetTopic
        } else if PRACTICE_TRIGGERS.iter().any(|t| lower.contains(t)) {
            Intent::Practice
        } else if EXPLAIN_TRIGGERS.iter().any(|t| lower.contains(t)) {
            Intent::Explanation
        } else if lower.contains(SKILL_PRACTICE_TRIGGER) {
            Intent::SkillPractice
        } else if has_estimates {
            Intent::WeakSkills
        } else {
            Intent::Fallback
        }
    }
}

/// Subject and topic the student is working on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSelection {
    pub subject: Option<String>,
    pub topic: Option<String>,
}

impl TopicSelection {
    pub fn new(subject: Option<&str>, topic: Option<&str>) -> Self {
        Self {
            subject: subject.map(str::to_string),
            topic: topic.map(str::to_string),
        }
    }
}

/// Parse `Start topic: Subject|Topic` or `Start topic: Topic`.
///
/// Anything other than exactly two `|`-separated parts keeps only the first
/// part as the topic. Blank parts are treated as absent.
pub fn parse_set_topic(instruction: &str) -> Option<TopicSelection> {
    let instruction = instruction.trim();
    if !instruction.to_lowercase().starts_with(SET_TOPIC_PREFIX) {
        return None;
    }
    let (_, raw) = instruction.split_once(':')?;
    let parts: Vec<&str> = raw.trim().split('|').map(str::trim).collect();

    let selection = match parts.as_slice() {
        [subject, topic] => TopicSelection::new(non_empty(Some(*subject)), non_empty(Some(*topic))),
        [topic, ..] => TopicSelection::new(None, non_empty(Some(*topic))),
        [] => TopicSelection::default(),
    };
    Some(selection)
}

/// Per-call inputs. Every field is optional.
#[derive(Debug, Clone, Default)]
pub struct TutorContext {
    pub session_id: Option<String>,
    pub given_problems: Option<AllocatorMemory>,
    pub subject: Option<String>,
    pub topic: Option<String>,
    pub skill: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub skill_estimates: Option<SkillEstimates>,
}

impl TutorContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_session(mut self, id: impl Into<String>) -> Self {
        self.session_id = Some(id.into());
        self
    }

    pub fn with_memory(mut self, memory: AllocatorMemory) -> Self {
        self.given_problems = Some(memory);
        self
    }

    pub fn with_topic(mut self, subject: Option<&str>, topic: Option<&str>) -> Self {
        self.subject = subject.map(str::to_string);
        self.topic = topic.map(str::to_string);
        self
    }

    pub fn with_skill(mut self, skill: impl Into<String>, difficulty: Option<Difficulty>) -> Self {
        self.skill = Some(skill.into());
        self.difficulty = difficulty;
        self
    }

    pub fn with_estimates(mut self, estimates: SkillEstimates) -> Self {
        self.skill_estimates = Some(estimates);
        self
    }
}

/// Result of one [`Tutor::respond`] call.
#[derive(Debug, Clone, Serialize)]
pub struct TutorReply {
    pub id: String,
    pub intent: Intent,
    pub text: String,
    /// Allocator memory after this call, for the caller to persist.
    pub given_problems: AllocatorMemory,
    /// Set only when the instruction changed the topic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<TopicSelection>,
}

/// A request for one practice item on a skill.
#[derive(Debug, Clone)]
pub struct PracticeRequest {
    pub prompt: String,
    pub skill: String,
    pub difficulty: Option<Difficulty>,
}

/// Produces practice text for a skill, threading allocator memory through.
pub trait PracticeGenerator {
    fn generate_practice(
        &mut self,
        request: &PracticeRequest,
        memory: AllocatorMemory,
    ) -> (String, AllocatorMemory);
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// What the tutor remembers for one session id.
#[derive(Debug, Clone, Default)]
struct SessionCache {
    memory: AllocatorMemory,
    current: TopicSelection,
}

/// The rule-based tutor.
pub struct Tutor {
    config: TutorConfig,
    sessions: HashMap<String, SessionCache>,
    rng: StdRng,
}

impl Tutor {
    pub fn new(config: TutorConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            config,
            sessions: HashMap::new(),
            rng,
        }
    }

    /// A tutor with a fixed seed and default settings.
    pub fn seeded(seed: u64) -> Self {
        Self::new(TutorConfig {
            seed: Some(seed),
            ..TutorConfig::default()
        })
    }

    /// The topic last set by `session_id`.
    pub fn current(&self, session_id: &str) -> Option<&TopicSelection> {
        self.sessions.get(session_id).map(|s| &s.current)
    }

    /// Cached memory for `session_id`.
    pub fn cache(&self, session_id: &str) -> Option<&AllocatorMemory> {
        self.sessions.get(session_id).map(|s| &s.memory)
    }

    /// Drop everything cached for `session_id`.
    pub fn forget(&mut self, session_id: &str) {
        self.sessions.remove(session_id);
    }

    /// Answer one instruction.
    pub fn respond(&mut self, instruction: &str, context: &TutorContext) -> TutorReply {
        let session_id = non_empty(context.session_id.as_deref());
        let mut session = session_id
            .and_then(|id| self.sessions.get(id))
            .cloned()
            .unwrap_or_default();
        if let Some(incoming) = &context.given_problems {
            session.memory.merge(incoming);
        }

        let instruction = instruction.trim();
        let has_estimates = context
            .skill_estimates
            .as_ref()
            .is_some_and(|e| !e.is_empty());
        let intent = Intent::classify(instruction, has_estimates);
        debug!(?intent, session = ?session_id, "routing instruction");

        let mut selection = None;
        let text = match intent {
            Intent::SetTopic => {
                let parsed = parse_set_topic(instruction).unwrap_or_default();
                let text = self.set_topic(&parsed);
                session.current = parsed.clone();
                selection = Some(parsed);
                text
            }
            Intent::Practice => {
                let (subject, topic) = resolve(context, &session.current);
                self.serve_practice(subject, topic, &mut session.memory)
            }
            Intent::Explanation => {
                let (subject, topic) = resolve(context, &session.current);
                explain(instruction, subject, topic)
            }
            Intent::SkillPractice => {
                let skill = non_empty(context.skill.as_deref()).unwrap_or("General");
                self.skill_practice(skill, context.difficulty, &mut session.memory)
            }
            Intent::WeakSkills => context
                .skill_estimates
                .as_ref()
                .map(weak_skill_summary)
                .unwrap_or_else(|| HELP_TEXT.to_string()),
            Intent::Fallback => HELP_TEXT.to_string(),
        };

        let given_problems = session.memory.clone();
        if let Some(id) = session_id {
            self.sessions.insert(id.to_string(), session);
        }

        TutorReply {
            id: crate::new_id(),
            intent,
            text,
            given_problems,
            selection,
        }
    }

    fn set_topic(&self, selection: &TopicSelection) -> String {
        info!(subject = ?selection.subject, topic = ?selection.topic, "topic set");
        format!(
            "Topic set to '{}' (Subject: {}). You can now ask for explanations or practice problems.",
            selection.topic.as_deref().unwrap_or(""),
            selection
                .subject
                .as_deref()
                .unwrap_or(&self.config.missing_subject_label),
        )
    }

    fn serve_practice(
        &mut self,
        subject: Option<String>,
        topic: Option<String>,
        memory: &mut AllocatorMemory,
    ) -> String {
        let key = memory_key(subject.as_deref(), topic.as_deref());
        let pool = bank::problem_pool(subject.as_deref(), topic.as_deref());
        let (entry, next) = allocate(&key, &pool, std::mem::take(memory), &mut self.rng);
        *memory = next;

        format!(
            "Practice Question for {} (Subject: {}):\n• {}\nHint: {}",
            topic.as_deref().unwrap_or("General"),
            subject.as_deref().unwrap_or("General"),
            entry.question,
            entry.hint,
        )
    }

    /// Practice for a catalog skill, without repeats per skill.
    fn skill_practice(
        &mut self,
        skill: &str,
        difficulty: Option<Difficulty>,
        memory: &mut AllocatorMemory,
    ) -> String {
        let subject = catalog::subject_of(skill);
        let pool = bank::lookup_pool(subject, Some(skill))
            .unwrap_or_else(|| ProblemPool::single(bank::sample_for_skill(skill)));
        let key = memory_key(subject, Some(skill));
        debug!(skill, ?difficulty, %key, "serving skill practice");

        let (entry, next) = allocate(&key, &pool, std::mem::take(memory), &mut self.rng);
        *memory = next;

        format!(
            "Practice Question for {skill}:\n• {}\nHint: {}",
            entry.question, entry.hint
        )
    }
}

/// Only the memory passed in is consulted and returned.
impl PracticeGenerator for Tutor {
    fn generate_practice(
        &mut self,
        request: &PracticeRequest,
        mut memory: AllocatorMemory,
    ) -> (String, AllocatorMemory) {
        debug!(prompt = %request.prompt, "practice requested");
        let text = self.skill_practice(&request.skill, request.difficulty, &mut memory);
        (text, memory)
    }
}

/// Context override first, then the session's current topic.
fn resolve(context: &TutorContext, current: &TopicSelection) -> (Option<String>, Option<String>) {
    let subject = non_empty(context.subject.as_deref())
        .or_else(|| non_empty(current.subject.as_deref()))
        .map(str::to_string);
    let topic = non_empty(context.topic.as_deref())
        .or_else(|| non_empty(current.topic.as_deref()))
        .map(str::to_string);
    (subject, topic)
}

fn explain(instruction: &str, subject: Option<String>, topic: Option<String>) -> String {
    if let Some(answer) = bank::direct_answer(instruction) {
        return answer.to_string();
    }
    bank::explanation(subject.as_deref(), topic.as_deref())
}

/// `Top weak skills: a(0.10), b(0.20), c(0.30)`.
fn weak_skill_summary(estimates: &SkillEstimates) -> String {
    let listed: Vec<String> = estimates
        .weakest(3)
        .into_iter()
        .map(|(skill, mastery)| format!("{skill}({mastery:.2})"))
        .collect();
    format!("Top weak skills: {}", listed.join(", "))
}
