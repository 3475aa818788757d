mod export;
mod throttle;

pub use export::{CandidateImportError, CsvCandidateImporter};
pub use throttle::Throttled;

use async_trait::async_trait;
use std::fmt::Debug;
use std::time::Duration;

use super::domain::{CandidateItem, Keyword, SearchRequest};

/// Parameters handed to every source for one search request.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchQuery {
    pub keywords: Vec<Keyword>,
    pub location: Option<String>,
    pub max_age_days: u32,
}

impl From<&SearchRequest> for FetchQuery {
    fn from(request: &SearchRequest) -> Self {
        Self {
            keywords: request.keywords.clone(),
            location: request.location.clone(),
            max_age_days: request.max_age_days,
        }
    }
}

/// Failure of a single source. Isolated to that source by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceFetchError {
    #[error("network failure: {0}")]
    Network(String),
    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("unparseable response: {0}")]
    Parse(String),
    #[error("cancelled before the request was issued")]
    Cancelled,
}

/// Boundary to a job source (forum search, search-engine results, job board).
/// Implementations own their retries and rate limiting.
#[async_trait]
pub trait SourceFetcher: Debug + Send + Sync {
    fn name(&self) -> &str;

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError>;
}

/// Source serving a fixed list of candidates, e.g. a CSV export or an inline
/// API payload.
#[derive(Debug, Clone)]
pub struct StaticSource {
    name: String,
    items: Vec<CandidateItem>,
}

impl StaticSource {
    /// Items are stamped with this source's name.
    pub fn new(name: impl Into<String>, items: Vec<CandidateItem>) -> Self {
        let name = name.into();
        let items = items
            .into_iter()
            .map(|mut item| {
                item.source_name = name.clone();
                item
            })
            .collect();
        Self { name, items }
    }

    pub fn items(&self) -> &[CandidateItem] {
        &self.items
    }
}

#[async_trait]
impl SourceFetcher for StaticSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError> {
        Ok(self.items.clone())
    }
}
