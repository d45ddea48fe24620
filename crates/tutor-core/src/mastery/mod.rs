use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::de::{IgnoredAny, MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::catalog;

/// Mastery assumed for any skill with no evidence.
pub const DEFAULT_MASTERY: f64 = 0.65;

/// Suggested practice difficulty for a mastery level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Easy => write!(f, "Easy"),
            Difficulty::Medium => write!(f, "Medium"),
            Difficulty::Hard => write!(f, "Hard"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}' (expected Easy, Medium or Hard)")]
pub struct ParseDifficultyError(pub String);

impl FromStr for Difficulty {
    type Err = ParseDifficultyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ParseDifficultyError(s.to_string())),
        }
    }
}

/// Upper bounds (exclusive) for the Easy and Medium bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MasteryThresholds {
    #[serde(default = "default_easy_below")]
    pub easy_below: f64,
    #[serde(default = "default_medium_below")]
    pub medium_below: f64,
}

fn default_easy_below() -> f64 {
    0.3
}
fn default_medium_below() -> f64 {
    0.6
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            easy_below: default_easy_below(),
            medium_below: default_medium_below(),
        }
    }
}

impl MasteryThresholds {
    pub fn classify(&self, mastery: f64) -> Difficulty {
        if mastery < self.easy_below {
            Difficulty::Easy
        } else if mastery < self.medium_below {
            Difficulty::Medium
        } else {
            Difficulty::Hard
        }
    }
}

/// Map a mastery score to a difficulty using the standard 0.3 / 0.6 bands.
pub fn classify(mastery: f64) -> Difficulty {
    MasteryThresholds::default().classify(mastery)
}

/// Skill → mastery, in insertion order.
///
/// Order matters: ranking sorts are stable, so ties keep the order in which
/// skills were inserted (or appeared in the source JSON object).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillEstimates {
    entries: Vec<(String, f64)>,
}

impl SkillEstimates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every given skill at the same mastery.
    pub fn uniform<'a>(skills: impl IntoIterator<Item = &'a str>, mastery: f64) -> Self {
        skills.into_iter().map(|s| (s, mastery)).collect()
    }

    /// Insert or replace. A replaced skill keeps its original position.
    pub fn insert(&mut self, skill: impl Into<String>, mastery: f64) -> Option<f64> {
        let skill = skill.into();
        match self.entries.iter_mut().find(|(name, _)| *name == skill) {
            Some((_, value)) => Some(std::mem::replace(value, mastery)),
            None => {
                self.entries.push((skill, mastery));
                None
            }
        }
    }

    pub fn get(&self, skill: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(name, _)| name == skill)
            .map(|(_, v)| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, v)| (name.as_str(), *v))
    }

    /// Entries sorted by ascending mastery; ties keep insertion order.
    pub fn ascending(&self) -> Vec<(&str, f64)> {
        let mut sorted: Vec<(&str, f64)> = self.iter().collect();
        sorted.sort_by(|a, b| a.1.total_cmp(&b.1));
        sorted
    }

    /// The `n` lowest-mastery skills, weakest first.
    pub fn weakest(&self, n: usize) -> Vec<(&str, f64)> {
        let mut sorted = self.ascending();
        sorted.truncate(n);
        sorted
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for SkillEstimates {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut estimates = SkillEstimates::new();
        for (skill, mastery) in iter {
            estimates.insert(skill, mastery);
        }
        estimates
    }
}

impl Serialize for SkillEstimates {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (skill, mastery) in &self.entries {
            map.serialize_entry(skill, mastery)?;
        }
        map.end()
    }
}

/// A score as it may appear in loosely-typed input.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawScore {
    Number(f64),
    Text(String),
    Other(IgnoredAny),
}

impl RawScore {
    fn to_f64(&self) -> Option<f64> {
        let value = match self {
            RawScore::Number(v) => Some(*v),
            RawScore::Text(s) => s.trim().parse::<f64>().ok(),
            RawScore::Other(_) => None,
        };
        value.filter(|v| v.is_finite())
    }
}

struct SkillEstimatesVisitor;

impl<'de> Visitor<'de> for SkillEstimatesVisitor {
    type Value = SkillEstimates;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of skill name to mastery score")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut estimates = SkillEstimates::new();
        while let Some((skill, raw)) = access.next_entry::<String, RawScore>()? {
            // Malformed scores degrade to the default instead of rejecting the map.
            let mastery = raw.to_f64().unwrap_or(DEFAULT_MASTERY);
            estimates.insert(skill, mastery);
        }
        Ok(estimates)
    }
}

impl<'de> Deserialize<'de> for SkillEstimates {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SkillEstimatesVisitor)
    }
}

/// One graded attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryRow {
    pub skill: String,
    #[serde(default)]
    pub score: Option<f64>,
}

impl HistoryRow {
    pub fn new(skill: impl Into<String>, score: f64) -> Self {
        Self {
            skill: skill.into(),
            score: Some(score),
        }
    }
}

/// Errors from parsing tabular score input.
#[derive(Debug, thiserror::Error)]
pub enum EstimateError {
    #[error("invalid table: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("row {row}: score for '{skill}' is not a number")]
    InvalidScore { row: usize, skill: String },
}

#[derive(Debug, Deserialize)]
struct TableRow {
    skill: String,
    #[serde(default)]
    score: Option<RawScore>,
}

/// Percentages (> 1.0) are scaled down to a fraction.
pub fn normalize_score(score: f64) -> f64 {
    if score > 1.0 {
        score / 100.0
    } else {
        score
    }
}

/// Derives per-skill mastery from graded attempts.
///
/// Only catalog skills are reported, in catalog order. Skills without
/// evidence get `default_mastery`.
#[derive(Debug, Clone)]
pub struct MasteryEstimator {
    pub default_mastery: f64,
}

impl Default for MasteryEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_MASTERY)
    }
}

impl MasteryEstimator {
    pub fn new(default_mastery: f64) -> Self {
        Self { default_mastery }
    }

    /// Every catalog skill at the default mastery.
    pub fn uniform(&self) -> SkillEstimates {
        SkillEstimates::uniform(catalog::all_skills(), self.default_mastery)
    }

    pub fn estimate_from_history(&self, history: &[HistoryRow]) -> SkillEstimates {
        let samples = history.iter().map(|row| {
            let score = row
                .score
                .filter(|v| v.is_finite())
                .unwrap_or(self.default_mastery);
            (row.skill.trim(), score)
        });
        self.aggregate(samples)
    }

    /// Parse a JSON array of `{student_id?, skill, score}` rows.
    ///
    /// Scores may be numbers or numeric strings; a missing score counts as
    /// the default mastery. Any other score is an error for the whole table.
    pub fn try_estimate_from_table(&self, json: &str) -> Result<SkillEstimates, EstimateError> {
        let rows: Vec<TableRow> = serde_json::from_str(json)?;
        let mut samples = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let score = match &row.score {
                None => self.default_mastery,
                Some(raw) => raw.to_f64().ok_or_else(|| EstimateError::InvalidScore {
                    row: i,
                    skill: row.skill.clone(),
                })?,
            };
            samples.push((row.skill.trim(), score));
        }
        Ok(self.aggregate(samples))
    }

    /// Like [`try_estimate_from_table`](Self::try_estimate_from_table) but
    /// fails closed: any parse error yields the uniform default.
    pub fn estimate_from_table(&self, json: &str) -> SkillEstimates {
        match self.try_estimate_from_table(json) {
            Ok(estimates) => estimates,
            Err(e) => {
                warn!(error = %e, "falling back to default mastery for every skill");
                self.uniform()
            }
        }
    }

    fn aggregate<'a>(&self, samples: impl IntoIterator<Item = (&'a str, f64)>) -> SkillEstimates {
        let mut per_skill: HashMap<&str, Vec<f64>> = HashMap::new();
        for (skill, score) in samples {
            per_skill.entry(skill).or_default().push(normalize_score(score));
        }
        debug!(skills = per_skill.len(), "aggregating mastery samples");

        catalog::all_skills()
            .into_iter()
            .map(|skill| {
                let mastery = match per_skill.get(skill) {
                    Some(values) if !values.is_empty() => {
                        let mean = values.iter().sum::<f64>() / values.len() as f64;
                        mean.clamp(0.0, 1.0)
                    }
                    _ => self.default_mastery,
                };
                (skill, mastery)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_boundaries() {
        assert_eq!(classify(0.29), Difficulty::Easy);
        assert_eq!(classify(0.3), Difficulty::Medium);
        assert_eq!(classify(0.59), Difficulty::Medium);
        assert_eq!(classify(0.6), Difficulty::Hard);
        assert_eq!(classify(0.0), Difficulty::Easy);
        assert_eq!(classify(1.0), Difficulty::Hard);
    }

    #[test]
    fn test_custom_thresholds() {
        let t = MasteryThresholds {
            easy_below: 0.5,
            medium_below: 0.8,
        };
        assert_eq!(t.classify(0.4), Difficulty::Easy);
        assert_eq!(t.classify(0.7), Difficulty::Medium);
        assert_eq!(t.classify(0.8), Difficulty::Hard);
    }

    #[test]
    fn test_difficulty_parse_and_display() {
        assert_eq!("easy".parse::<Difficulty>().unwrap(), Difficulty::Easy);
        assert_eq!(" Hard ".parse::<Difficulty>().unwrap(), Difficulty::Hard);
        assert!("extreme".parse::<Difficulty>().is_err());
        assert_eq!(Difficulty::Medium.to_string(), "Medium");
    }

    #[test]
    fn test_estimates_insert_keeps_position() {
        let mut est = SkillEstimates::new();
        est.insert("a", 0.1);
        est.insert("b", 0.2);
        assert_eq!(est.insert("a", 0.9), Some(0.1));
        let names: Vec<&str> = est.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(est.get("a"), Some(0.9));
    }

    #[test]
    fn test_ascending_is_stable_on_ties() {
        let est: SkillEstimates = vec![("x", 0.5), ("y", 0.2), ("z", 0.5), ("w", 0.2)]
            .into_iter()
            .collect();
        let order: Vec<&str> = est.ascending().into_iter().map(|(n, _)| n).collect();
        assert_eq!(order, vec!["y", "w", "x", "z"]);
    }

    #[test]
    fn test_weakest_truncates() {
        let est: SkillEstimates = vec![("a", 0.9), ("b", 0.1), ("c", 0.4), ("d", 0.3)]
            .into_iter()
            .collect();
        let weak: Vec<&str> = est.weakest(3).into_iter().map(|(n, _)| n).collect();
        assert_eq!(weak, vec!["b", "d", "c"]);
    }

    #[test]
    fn test_estimates_json_preserves_order() {
        let est: SkillEstimates = serde_json::from_str(r#"{"zeta": 0.1, "alpha": 0.2}"#).unwrap();
        let names: Vec<&str> = est.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["zeta", "alpha"]);

        let json = serde_json::to_string(&est).unwrap();
        assert_eq!(json, r#"{"zeta":0.1,"alpha":0.2}"#);
    }

    #[test]
    fn test_estimates_json_malformed_value_is_default() {
        let est: SkillEstimates =
            serde_json::from_str(r#"{"a": "oops", "b": null, "c": "0.4"}"#).unwrap();
        assert_eq!(est.get("a"), Some(DEFAULT_MASTERY));
        assert_eq!(est.get("b"), Some(DEFAULT_MASTERY));
        assert_eq!(est.get("c"), Some(0.4));
    }

    #[test]
    fn test_history_empty_is_uniform_default() {
        let est = MasteryEstimator::default().estimate_from_history(&[]);
        assert_eq!(est.len(), catalog::all_skills().len());
        assert!(est.iter().all(|(_, v)| v == DEFAULT_MASTERY));
    }

    #[test]
    fn test_history_percentages_and_mean() {
        let history = vec![
            HistoryRow::new("algebra", 80.0),
            HistoryRow::new("algebra", 0.4),
            HistoryRow::new(" motion ", 0.2),
        ];
        let est = MasteryEstimator::default().estimate_from_history(&history);
        assert!((est.get("algebra").unwrap() - 0.6).abs() < 1e-9);
        assert!((est.get("motion").unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(est.get("geometry"), Some(DEFAULT_MASTERY));
    }

    #[test]
    fn test_history_clamps_and_ignores_unknown_skills() {
        let history = vec![
            HistoryRow::new("algebra", 250.0),
            HistoryRow::new("fractions", -0.5),
            HistoryRow::new("juggling", 0.1),
        ];
        let est = MasteryEstimator::default().estimate_from_history(&history);
        assert_eq!(est.get("algebra"), Some(1.0));
        assert_eq!(est.get("fractions"), Some(0.0));
        assert_eq!(est.get("juggling"), None);
    }

    #[test]
    fn test_history_missing_score_counts_as_default() {
        let history = vec![HistoryRow {
            skill: "cell".to_string(),
            score: None,
        }];
        let est = MasteryEstimator::new(0.5).estimate_from_history(&history);
        assert_eq!(est.get("cell"), Some(0.5));
    }

    #[test]
    fn test_table_estimate() {
        let table = r#"[
            {"student_id": "s1", "skill": "genetics", "score": 90},
            {"student_id": 2, "skill": "genetics", "score": "0.5"},
            {"skill": "optics"}
        ]"#;
        let est = MasteryEstimator::default()
            .try_estimate_from_table(table)
            .unwrap();
        assert!((est.get("genetics").unwrap() - 0.7).abs() < 1e-9);
        assert_eq!(est.get("optics"), Some(DEFAULT_MASTERY));
    }

    #[test]
    fn test_table_bad_score_fails_closed() {
        let table = r#"[
            {"skill": "genetics", "score": 0.1},
            {"skill": "optics", "score": "lots"}
        ]"#;
        let estimator = MasteryEstimator::new(0.65);
        assert!(matches!(
            estimator.try_estimate_from_table(table),
            Err(EstimateError::InvalidScore { row: 1, .. })
        ));
        let est = estimator.estimate_from_table(table);
        assert_eq!(est, estimator.uniform());
    }

    #[test]
    fn test_table_null_score_keeps_rest_of_table() {
        let table = r#"[
            {"skill": "genetics", "score": 0.2},
            {"skill": "optics", "score": null}
        ]"#;
        let est = MasteryEstimator::default().estimate_from_table(table);
        assert_eq!(est.get("genetics"), Some(0.2));
        assert_eq!(est.get("optics"), Some(DEFAULT_MASTERY));
    }

    #[test]
    fn test_table_not_json_fails_closed() {
        let estimator = MasteryEstimator::default();
        let est = estimator.estimate_from_table("skill,score\nalgebra,0.2");
        assert_eq!(est.get("algebra"), Some(DEFAULT_MASTERY));
        assert_eq!(est.len(), catalog::all_skills().len());
    }
}
