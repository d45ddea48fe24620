//! Static tutoring content: practice pools, explanations, direct answers and
//! per-skill sample questions.
//!
//! Every lookup degrades to a generic answer instead of failing.

use crate::allocator::{ProblemEntry, ProblemPool};

type Pair = (&'static str, &'static str);

/// Asked when nothing more specific is known.
pub const GENERIC_PROBLEM: Pair = ("Solve a basic problem.", "Think carefully!");

/// Practice pools keyed by (subject, topic).
const PROBLEM_POOLS: &[(&str, &str, &[Pair])] = &[
    (
        "Mathematics",
        "fractions",
        &[
            ("1/2 + 3/4 = ?", "Use common denominator."),
            ("5/6 - 1/3 = ?", "Convert to like terms."),
            ("2/3 × 9/4 = ?", "Multiply numerators and denominators, then simplify."),
        ],
    ),
    (
        "Mathematics",
        "algebra",
        &[
            ("Solve 2x + 5 = 11", "Isolate x."),
            ("Factor x² - 5x + 6", "Find two numbers that multiply to 6."),
            ("Solve 3(x - 2) = 12", "Divide both sides by 3 first."),
        ],
    ),
    (
        "Mathematics",
        "integration",
        &[
            ("∫ 2x dx = ?", "Reverse the power rule."),
            ("∫ x ln(x) dx", "Use integration by parts."),
        ],
    ),
    (
        "Physics",
        "mechanics",
        &[
            ("F=10N, m=2kg → a=?", "Use a=F/m."),
            ("A car accelerates from 0–20 m/s in 4s → a=?", "Use Δv / t."),
        ],
    ),
    (
        "Physics",
        "motion",
        &[
            ("A cyclist covers 30 m in 6 s. Speed?", "Use v = d / t."),
            ("Starting at rest with a = 2 m/s², distance after 5 s?", "Use s = ½at²."),
        ],
    ),
    (
        "Chemistry",
        "atomic structure",
        &[
            ("How many electrons fit in n=3 shell?", "Use 2n²."),
            ("Define valence shell.", "Outer electron shell."),
        ],
    ),
    (
        "Biology",
        "genetics",
        &[
            ("Probability of AB in AaBb x AaBb?", "Use Punnett square."),
            ("Define genotype.", "Genetic makeup."),
        ],
    ),
];

/// Short topic explanations, keyed by lowercase topic or subject.
const EXPLANATIONS: &[Pair] = &[
    ("fractions", "Fractions represent parts of a whole. Always make denominators equal before operating."),
    ("algebra", "Algebra is about solving for unknowns using equations."),
    ("integration", "Integration accumulates quantities—area under curves, volumes, etc."),
    ("calculus", "Calculus deals with derivatives (rates) and integrals (accumulations)."),
    ("mechanics", "Mechanics studies forces, motion, and Newton’s laws."),
    ("motion", "Motion describes how position changes over time: displacement, velocity, and acceleration."),
    ("geometry", "Geometry covers shapes, angles, area, perimeter, and volume."),
    ("genetics", "Genetics studies how traits are inherited through genes and alleles."),
    ("chemistry", "Chemistry studies atoms, molecules, reactions, and equations."),
    ("biology", "Biology studies life processes, cells, genetics, and evolution."),
    ("history", "History deals with past events, civilizations, and timelines."),
];

/// Canned answers; every keyword must appear in the prompt.
const DIRECT_ANSWERS: &[(&[&str], &str)] = &[
    (&["newton", "law"], "Newton’s laws: (1) Inertia, (2) F = m·a, (3) Action–Reaction."),
    (&["what is integration"], "Integration finds areas, volumes, or antiderivatives."),
    (&["what is derivative"], "The derivative measures rate of change: d/dx xⁿ = n·xⁿ⁻¹."),
];

/// Sample question per skill keyword. The first keyword contained in the
/// skill name wins, so order is significant.
const SKILL_SAMPLES: &[(&str, Pair)] = &[
    ("fractions", ("Add 1/2 + 3/4", "Find a common denominator.")),
    ("algebra", ("Solve 2x + 5 = 11", "Isolate x.")),
    ("integration", ("∫ x ln(x) dx", "Use integration by parts.")),
    ("calculus", ("Differentiate x³", "Use power rule.")),
    ("mechanics", ("F=20N, m=4kg → a?", "Use a=F/m.")),
    ("geometry", ("Find area of triangle base=5, height=6", "Use ½bh.")),
    ("chemistry", ("Balance: H₂ + O₂ → H₂O", "Balance atoms.")),
    ("biology", ("What is a cell?", "Basic structural unit of life.")),
    ("history", ("When did India gain independence?", "1947.")),
];

fn to_entry((question, hint): Pair) -> ProblemEntry {
    ProblemEntry::new(question, hint)
}

/// Lowercase, trimmed, with underscores read as spaces.
fn normalize(name: &str) -> String {
    name.trim().to_lowercase().replace('_', " ")
}

fn normalize_subject(subject: &str) -> String {
    match normalize(subject).as_str() {
        "math" | "maths" => "mathematics".to_string(),
        other => other.to_string(),
    }
}

pub fn generic_entry() -> ProblemEntry {
    to_entry(GENERIC_PROBLEM)
}

/// The pool for exactly this (subject, topic), if one exists.
pub fn lookup_pool(subject: Option<&str>, topic: Option<&str>) -> Option<ProblemPool> {
    let subject = normalize_subject(subject?);
    let topic = normalize(topic?);
    PROBLEM_POOLS
        .iter()
        .find(|(s, t, _)| normalize_subject(s) == subject && normalize(t) == topic)
        .and_then(|(_, _, pairs)| ProblemPool::new(pairs.iter().copied().map(to_entry).collect()))
}

/// The pool for (subject, topic), or the one-entry generic pool.
pub fn problem_pool(subject: Option<&str>, topic: Option<&str>) -> ProblemPool {
    lookup_pool(subject, topic).unwrap_or_else(|| ProblemPool::single(generic_entry()))
}

pub fn direct_answer(prompt: &str) -> Option<&'static str> {
    let lower = prompt.to_lowercase();
    DIRECT_ANSWERS
        .iter()
        .find(|(keywords, _)| keywords.iter().all(|k| lower.contains(k)))
        .map(|(_, answer)| *answer)
}

/// Explanation keyed by topic (or subject when no topic is set).
pub fn explanation(subject: Option<&str>, topic: Option<&str>) -> String {
    let key = topic.or(subject).map(normalize).unwrap_or_default();
    EXPLANATIONS
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, text)| text.to_string())
        .unwrap_or_else(|| {
            format!(
                "Explanation for {} (Subject: {}) not available. Try a practice problem!",
                topic.unwrap_or("General"),
                subject.unwrap_or("General"),
            )
        })
}

/// Sample entry for a skill by keyword, or the generic entry.
pub fn sample_for_skill(skill: &str) -> ProblemEntry {
    let skill = skill.to_lowercase();
    SKILL_SAMPLES
        .iter()
        .find(|(keyword, _)| skill.contains(keyword))
        .map(|(_, pair)| to_entry(*pair))
        .unwrap_or_else(generic_entry)
}
