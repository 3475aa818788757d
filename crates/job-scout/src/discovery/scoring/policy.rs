use serde::{Deserialize, Serialize};

use super::config::ModeThresholds;
use super::RelevanceOutcome;
use crate::discovery::domain::{RejectionReason, SearchMode};
use crate::discovery::location::LocationAssessment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "reason")]
pub enum AcceptanceDecision {
    Accepted,
    Rejected(RejectionReason),
}

impl AcceptanceDecision {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Score alone never admits an item: at least one keyword must also match
/// under the request's mode, so auxiliary bonuses cannot carry an
/// irrelevant posting over the threshold.
pub(crate) fn decide_acceptance(
    outcome: &RelevanceOutcome,
    mode: SearchMode,
    thresholds: &ModeThresholds,
    location: &LocationAssessment,
) -> AcceptanceDecision {
    if location.rejects_after_scoring() {
        return AcceptanceDecision::Rejected(RejectionReason::OutsideLocation);
    }

    if outcome.matched_keywords.is_empty() {
        return AcceptanceDecision::Rejected(RejectionReason::NoKeywordMatch);
    }

    if outcome.score < thresholds.for_mode(mode) {
        return AcceptanceDecision::Rejected(RejectionReason::BelowThreshold);
    }

    AcceptanceDecision::Accepted
}
