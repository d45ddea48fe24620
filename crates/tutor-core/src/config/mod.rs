use serde::{Deserialize, Serialize};

use crate::mastery::{MasteryThresholds, DEFAULT_MASTERY};

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default)]
    pub tutor: TutorConfig,

    #[serde(default)]
    pub mastery: MasteryConfig,

    #[serde(default)]
    pub recommend: RecommendConfig,
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            tutor: TutorConfig::default(),
            mastery: MasteryConfig::default(),
            recommend: RecommendConfig::default(),
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.mastery.default_mastery) {
            return Err(ConfigError::ValidationError(
                "mastery.default_mastery must be within [0, 1]".to_string(),
            ));
        }
        let t = &self.mastery.thresholds;
        if !(0.0..=1.0).contains(&t.easy_below) || !(0.0..=1.0).contains(&t.medium_below) {
            return Err(ConfigError::ValidationError(
                "mastery thresholds must be within [0, 1]".to_string(),
            ));
        }
        if t.easy_below > t.medium_below {
            return Err(ConfigError::ValidationError(
                "mastery.thresholds.easy_below must not exceed medium_below".to_string(),
            ));
        }
        if self.recommend.top_k == 0 {
            return Err(ConfigError::ValidationError(
                "recommend.top_k must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Response router settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorConfig {
    /// Rendered in the set-topic confirmation when no subject was given.
    #[serde(default = "default_missing_subject_label")]
    pub missing_subject_label: String,
    /// Fixed RNG seed for reproducible practice selection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

fn default_missing_subject_label() -> String {
    "None".to_string()
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            missing_subject_label: default_missing_subject_label(),
            seed: None,
        }
    }
}

/// Mastery estimation and difficulty bands.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteryConfig {
    #[serde(default = "default_mastery")]
    pub default_mastery: f64,
    #[serde(default)]
    pub thresholds: MasteryThresholds,
}

fn default_mastery() -> f64 {
    DEFAULT_MASTERY
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            default_mastery: default_mastery(),
            thresholds: MasteryThresholds::default(),
        }
    }
}

/// Recommendation ranking settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    8
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
        }
    }
}

/// Errors from configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    ParseError(String),
    #[error("config serialize error: {0}")]
    SerializeError(String),
    #[error("config validation error: {0}")]
    ValidationError(String),
}
