use serde::{Deserialize, Serialize};

use crate::discovery::domain::SearchMode;

/// Weights combined by the relevance scorer. The defaults are a starting
/// policy tuned by hand, not a contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelevanceConfig {
    pub coverage_weight: f32,
    pub category_weight: f32,
    pub phrase_bonus: f32,
    pub remote_bonus: f32,
    pub compensation_bonus: f32,
    pub freshness_bonus: f32,
    pub freshness_window_hours: u32,
}

impl Default for RelevanceConfig {
    fn default() -> Self {
        Self {
            coverage_weight: 0.55,
            category_weight: 0.1,
            phrase_bonus: 0.2,
            remote_bonus: 0.1,
            compensation_bonus: 0.05,
            freshness_bonus: 0.1,
            freshness_window_hours: 48,
        }
    }
}

/// Minimum score an item needs under each mode.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeThresholds {
    pub strict: f32,
    pub moderate: f32,
    pub loose: f32,
}

impl ModeThresholds {
    pub const fn for_mode(&self, mode: SearchMode) -> f32 {
        match mode {
            SearchMode::Strict => self.strict,
            SearchMode::Moderate => self.moderate,
            SearchMode::Loose => self.loose,
        }
    }
}

impl Default for ModeThresholds {
    fn default() -> Self {
        Self {
            strict: 0.6,
            moderate: 0.25,
            loose: 0.10,
        }
    }
}
