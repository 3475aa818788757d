use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

use super::config::RelevanceConfig;
use super::{ScoreComponent, ScoreSignal};
use crate::discovery::domain::{CandidateItem, SearchRequest};
use crate::discovery::location::LocationAssessment;
use crate::discovery::matcher;
use crate::discovery::vocabulary::VocabularyTable;

/// A figure next to a currency symbol or code, an hourly/yearly rate, a
/// `Nk-Mk` range, or a bare `Nk` with salary wording around it. Runs on the
/// lower-cased corpus.
static COMPENSATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"[$€£¥₹]\s?\d",
        r"|\b(?:usd|eur|gbp|cad|aud)\s?\d",
        r"|\d\s?(?:usd|eur|gbp|cad|aud)\b",
        r"|\d\s?(?:/\s?|\s(?:per|an)\s)(?:hr|hour|yr|year|annum|mo|month)\b",
        r"|\b\d+(?:\.\d+)?k\s?(?:-|–|to)\s?\d+(?:\.\d+)?k\b",
        r"|\b\d+(?:\.\d+)?k\s?(?:base|salary|ote|per\s|/)",
        r"|\b(?:salary|pays?|paying|compensation|budget|rate|ote)\b\D{0,20}\d+(?:\.\d+)?k\b",
    ))
    .expect("compensation pattern compiles")
});

pub(crate) struct MatchSignals {
    pub matched_keywords: Vec<String>,
}

pub(crate) struct ScoringContext<'a> {
    pub corpus: &'a str,
    pub candidate: &'a CandidateItem,
    pub request: &'a SearchRequest,
    pub location: &'a LocationAssessment,
    pub now: DateTime<Utc>,
}

pub(crate) fn score_candidate(
    context: &ScoringContext<'_>,
    vocabulary: &VocabularyTable,
    config: &RelevanceConfig,
) -> (Vec<ScoreComponent>, f32, MatchSignals) {
    let mut components = Vec::new();
    let mut total_score: f32 = 0.0;

    let mut best_coverage = 0.0_f32;
    let mut best_category = 0.0_f32;
    let mut best_keyword_value = 0.0_f32;
    let mut best_keyword: Option<&str> = None;
    let mut phrase_keyword: Option<&str> = None;
    let mut matched_keywords = Vec::new();

    for keyword in &context.request.keywords {
        let evidence = matcher::analyze(context.corpus, keyword, vocabulary);
        if evidence.matches(context.request.mode) {
            matched_keywords.push(keyword.phrase().to_string());
        }
        if evidence.phrase_hit && phrase_keyword.is_none() {
            phrase_keyword = Some(keyword.phrase());
        }

        let coverage = evidence.coverage();
        let category = evidence.category_coverage();
        let value = coverage * config.coverage_weight + category * config.category_weight;
        if value > best_keyword_value {
            best_keyword_value = value;
            best_coverage = coverage;
            best_category = category;
            best_keyword = Some(keyword.phrase());
        }
    }

    let coverage_score = best_coverage * config.coverage_weight;
    components.push(ScoreComponent {
        signal: ScoreSignal::KeywordCoverage,
        score: coverage_score,
        notes: match best_keyword {
            Some(phrase) => format!(
                "{:.0}% of '{}' words present or implied",
                best_coverage * 100.0,
                phrase
            ),
            None => "no keyword words present".to_string(),
        },
    });
    total_score += coverage_score;

    if best_category > 0.0 {
        let category_score = best_category * config.category_weight;
        components.push(ScoreComponent {
            signal: ScoreSignal::CategoryCoverage,
            score: category_score,
            notes: format!(
                "{:.0}% of words only reached via broad category",
                best_category * 100.0
            ),
        });
        total_score += category_score;
    }

    if let Some(phrase) = phrase_keyword {
        components.push(ScoreComponent {
            signal: ScoreSignal::ExactPhrase,
            score: config.phrase_bonus,
            notes: format!("exact phrase '{phrase}' present"),
        });
        total_score += config.phrase_bonus;
    }

    if context.location.remote_required && context.location.is_remote {
        components.push(ScoreComponent {
            signal: ScoreSignal::Remote,
            score: config.remote_bonus,
            notes: "remote posting for a remote search".to_string(),
        });
        total_score += config.remote_bonus;
    }

    if mentions_compensation(context.corpus) {
        components.push(ScoreComponent {
            signal: ScoreSignal::Compensation,
            score: config.compensation_bonus,
            notes: "compensation figure listed".to_string(),
        });
        total_score += config.compensation_bonus;
    }

    let age = context.now.signed_duration_since(context.candidate.created_at);
    if age <= Duration::hours(i64::from(config.freshness_window_hours)) {
        components.push(ScoreComponent {
            signal: ScoreSignal::Freshness,
            score: config.freshness_bonus,
            notes: format!(
                "posted within {} hours",
                config.freshness_window_hours
            ),
        });
        total_score += config.freshness_bonus;
    }

    let signals = MatchSignals { matched_keywords };

    (components, total_score.clamp(0.0, 1.0), signals)
}

pub(crate) fn mentions_compensation(corpus: &str) -> bool {
    COMPENSATION.is_match(corpus)
}
