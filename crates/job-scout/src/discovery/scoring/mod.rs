mod config;
mod policy;
mod rules;

pub use config::{ModeThresholds, RelevanceConfig};
pub use policy::AcceptanceDecision;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::domain::{CandidateItem, SearchRequest};
use super::location::LocationAssessment;
use super::vocabulary::VocabularyTable;
use policy::decide_acceptance;
use rules::ScoringContext;

/// Stateless scorer applying the weight configuration and mode thresholds.
#[derive(Debug, Clone)]
pub struct RelevanceEngine {
    config: RelevanceConfig,
    thresholds: ModeThresholds,
    vocabulary: Arc<VocabularyTable>,
}

impl RelevanceEngine {
    pub fn new(
        vocabulary: Arc<VocabularyTable>,
        config: RelevanceConfig,
        thresholds: ModeThresholds,
    ) -> Self {
        Self {
            config,
            thresholds,
            vocabulary,
        }
    }

    pub fn thresholds(&self) -> &ModeThresholds {
        &self.thresholds
    }

    /// Pure in all inputs: the same corpus, candidate, request, and instant
    /// always produce the same outcome.
    pub fn score(
        &self,
        corpus: &str,
        candidate: &CandidateItem,
        request: &SearchRequest,
        location: &LocationAssessment,
        now: DateTime<Utc>,
    ) -> RelevanceOutcome {
        let context = ScoringContext {
            corpus,
            candidate,
            request,
            location,
            now,
        };
        let (components, score, signals) =
            rules::score_candidate(&context, &self.vocabulary, &self.config);

        RelevanceOutcome {
            score,
            components,
            matched_keywords: signals.matched_keywords,
        }
    }

    pub fn decide(
        &self,
        outcome: &RelevanceOutcome,
        request: &SearchRequest,
        location: &LocationAssessment,
    ) -> AcceptanceDecision {
        decide_acceptance(outcome, request.mode, &self.thresholds, location)
    }
}

/// Signals contributing to a relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreSignal {
    KeywordCoverage,
    CategoryCoverage,
    ExactPhrase,
    Remote,
    Compensation,
    Freshness,
}

/// Discrete contribution to a score, kept for audits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreComponent {
    pub signal: ScoreSignal,
    pub score: f32,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelevanceOutcome {
    pub score: f32,
    pub components: Vec<ScoreComponent>,
    pub matched_keywords: Vec<String>,
}
