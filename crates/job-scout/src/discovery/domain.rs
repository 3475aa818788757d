use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use super::scoring::ScoreComponent;

/// Words at or below this many characters carry no discriminative signal.
pub const SKIP_WORD_MAX_LEN: usize = 2;

pub const DEFAULT_MAX_AGE_DAYS: u32 = 30;
pub const DEFAULT_LIMIT: usize = 50;

/// Matching permissiveness selected by the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Strict,
    Moderate,
    Loose,
}

impl SearchMode {
    pub const fn ordered() -> [Self; 3] {
        [Self::Strict, Self::Moderate, Self::Loose]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Strict => "strict",
            Self::Moderate => "moderate",
            Self::Loose => "loose",
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown search mode '{0}' (expected strict, moderate, or loose)")]
pub struct ParseSearchModeError(pub String);

impl FromStr for SearchMode {
    type Err = ParseSearchModeError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "moderate" => Ok(Self::Moderate),
            "loose" => Ok(Self::Loose),
            _ => Err(ParseSearchModeError(value.to_string())),
        }
    }
}

/// User-supplied phrase. The original spelling is kept for display; matching
/// always uses the lower-cased form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Keyword {
    phrase: String,
    normalized: String,
}

impl Keyword {
    pub fn new(phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        let normalized = phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Self { phrase, normalized }
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    pub fn is_blank(&self) -> bool {
        self.normalized.is_empty()
    }

    pub fn words(&self) -> impl Iterator<Item = &str> {
        self.normalized.split_whitespace()
    }

    /// Words longer than [`SKIP_WORD_MAX_LEN`] characters.
    pub fn qualifying_words(&self) -> Vec<&str> {
        self.words()
            .filter(|word| word.chars().count() > SKIP_WORD_MAX_LEN)
            .collect()
    }
}

impl From<String> for Keyword {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for Keyword {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<Keyword> for String {
    fn from(value: Keyword) -> Self {
        value.phrase
    }
}

/// Raw posting produced by a source fetcher. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub source_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upvote_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment_count: Option<u32>,
    #[serde(default)]
    pub source_url: String,
}

/// Accepted candidate with its relevance evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredItem {
    pub candidate: CandidateItem,
    pub relevance_score: f32,
    pub matched_mode: SearchMode,
    pub matched_keywords: Vec<String>,
    pub is_remote: bool,
    pub location_match: bool,
    pub accepted_at: DateTime<Utc>,
    pub components: Vec<ScoreComponent>,
}

/// Errors that reject a search request before any source is contacted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidRequestError {
    #[error("search request must contain at least one keyword")]
    EmptyKeywords,
    #[error("search request limit must be positive")]
    NonPositiveLimit,
    #[error("search request max age must be at least one day")]
    NonPositiveMaxAge,
}

/// A single user query. Built once, read-only during discovery.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub keywords: Vec<Keyword>,
    pub mode: SearchMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub remote_only: bool,
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_max_age_days() -> u32 {
    DEFAULT_MAX_AGE_DAYS
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}

impl SearchRequest {
    /// Blank phrases are dropped and repeated phrases collapse onto the first
    /// occurrence, keeping insertion order for reporting.
    pub fn new<I, K>(keywords: I, mode: SearchMode) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<Keyword>,
    {
        let mut unique: Vec<Keyword> = Vec::new();
        for keyword in keywords.into_iter().map(Into::into) {
            if keyword.is_blank() {
                continue;
            }
            if unique
                .iter()
                .all(|existing| existing.normalized() != keyword.normalized())
            {
                unique.push(keyword);
            }
        }

        Self {
            keywords: unique,
            mode,
            location: None,
            remote_only: false,
            max_age_days: DEFAULT_MAX_AGE_DAYS,
            limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        let location = location.into();
        self.location = if location.trim().is_empty() {
            None
        } else {
            Some(location)
        };
        self
    }

    pub fn remote_only(mut self, remote_only: bool) -> Self {
        self.remote_only = remote_only;
        self
    }

    pub fn with_max_age_days(mut self, max_age_days: u32) -> Self {
        self.max_age_days = max_age_days;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn validate(&self) -> Result<(), InvalidRequestError> {
        if self.keywords.iter().all(Keyword::is_blank) {
            return Err(InvalidRequestError::EmptyKeywords);
        }
        if self.limit == 0 {
            return Err(InvalidRequestError::NonPositiveLimit);
        }
        if self.max_age_days == 0 {
            return Err(InvalidRequestError::NonPositiveMaxAge);
        }
        Ok(())
    }

    pub(crate) fn normalized_location(&self) -> Option<String> {
        self.location
            .as_deref()
            .map(|location| location.trim().to_lowercase())
            .filter(|location| !location.is_empty())
    }
}

/// Why a fetched candidate did not make it into the results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    Expired,
    NotRemote,
    OutsideLocation,
    NoKeywordMatch,
    BelowThreshold,
    Duplicate,
}

impl RejectionReason {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Expired => "older than requested age",
            Self::NotRemote => "not remote",
            Self::OutsideLocation => "outside requested location",
            Self::NoKeywordMatch => "no keyword matched",
            Self::BelowThreshold => "score below mode threshold",
            Self::Duplicate => "duplicate of an earlier item",
        }
    }
}

/// Pipeline stages a request passes through, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStage {
    Pending,
    Fetching,
    Normalizing,
    Scoring,
    Filtering,
    Deduping,
    Done,
}

impl DiscoveryStage {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Pending,
            Self::Fetching,
            Self::Normalizing,
            Self::Scoring,
            Self::Filtering,
            Self::Deduping,
            Self::Done,
        ]
    }

    pub const fn successor(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::Fetching),
            Self::Fetching => Some(Self::Normalizing),
            Self::Normalizing => Some(Self::Scoring),
            Self::Scoring => Some(Self::Filtering),
            Self::Filtering => Some(Self::Deduping),
            Self::Deduping => Some(Self::Done),
            Self::Done => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Fetching => "fetching",
            Self::Normalizing => "normalizing",
            Self::Scoring => "scoring",
            Self::Filtering => "filtering",
            Self::Deduping => "deduping",
            Self::Done => "done",
        }
    }
}

/// Overall outcome of the fetch phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryStatus {
    Complete,
    PartialFailure,
    Failed,
    Cancelled,
}

impl DiscoveryStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::PartialFailure => "partial failure",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryResult {
    pub items: Vec<ScoredItem>,
    pub total_candidates_seen: usize,
    pub per_source_errors: BTreeMap<String, String>,
    pub status: DiscoveryStatus,
    pub stages: Vec<DiscoveryStage>,
    pub rejections: BTreeMap<RejectionReason, usize>,
}
