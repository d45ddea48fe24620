//! Static skill catalog: subjects and the skills taught under each.

/// Subject → skills, in display order.
pub const SKILL_CATALOG: &[(&str, &[&str])] = &[
    (
        "Mathematics",
        &[
            "algebra",
            "geometry",
            "trigonometry",
            "mensuration",
            "coordinate_geometry",
            "calculus",
            "probability",
            "statistics",
            "fractions",
            "addition",
            "subtraction",
            "multiplication",
            "division",
            "exponents",
            "integration",
        ],
    ),
    (
        "Physics",
        &[
            "mechanics",
            "motion",
            "force_and_laws",
            "gravitation",
            "work_energy_power",
            "electricity",
            "magnetism",
            "light",
            "thermodynamics",
            "optics",
        ],
    ),
    (
        "Chemistry",
        &[
            "atomic_structure",
            "chemical_bonding",
            "acids_bases_salts",
            "metals_nonmetals",
            "carbon_compounds",
            "periodic_table",
            "solutions",
            "chemical_reactions",
        ],
    ),
    (
        "Biology",
        &[
            "cell",
            "tissues",
            "reproduction",
            "genetics",
            "evolution",
            "life_processes",
            "environment",
            "human_body",
        ],
    ),
    (
        "History",
        &["ancient_india", "medieval_india", "modern_india", "world_history"],
    ),
    (
        "Geography",
        &[
            "climate",
            "resources",
            "agriculture",
            "population",
            "natural_disasters",
        ],
    ),
    (
        "English",
        &["grammar", "writing", "reading_comprehension", "literature"],
    ),
    (
        "CS",
        &["variables", "basic_programming", "data_structures", "algorithms"],
    ),
];

/// All subject names.
pub fn subjects() -> Vec<&'static str> {
    SKILL_CATALOG.iter().map(|(subject, _)| *subject).collect()
}

/// Skills listed under `subject`. Unknown subjects have no skills.
pub fn skills_of(subject: &str) -> &'static [&'static str] {
    SKILL_CATALOG
        .iter()
        .find(|(name, _)| *name == subject)
        .map(|(_, skills)| *skills)
        .unwrap_or(&[])
}

/// Every skill in the catalog, flattened in subject order.
pub fn all_skills() -> Vec<&'static str> {
    SKILL_CATALOG
        .iter()
        .flat_map(|(_, skills)| skills.iter().copied())
        .collect()
}

/// The subject a skill belongs to, if it is in the catalog.
pub fn subject_of(skill: &str) -> Option<&'static str> {
    SKILL_CATALOG
        .iter()
        .find(|(_, skills)| skills.iter().any(|s| *s == skill))
        .map(|(subject, _)| *subject)
}
