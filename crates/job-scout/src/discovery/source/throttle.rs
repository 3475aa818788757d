use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::{FetchQuery, SourceFetchError, SourceFetcher};
use crate::discovery::domain::CandidateItem;

/// Enforces a minimum delay between successive requests to one source.
/// Concurrent callers queue behind each other.
#[derive(Debug)]
pub struct Throttled<S> {
    inner: S,
    min_interval: Duration,
    last_issued: Mutex<Option<Instant>>,
}

impl<S> Throttled<S> {
    pub fn new(inner: S, min_interval: Duration) -> Self {
        Self {
            inner,
            min_interval,
            last_issued: Mutex::new(None),
        }
    }
}

#[async_trait]
impl<S> SourceFetcher for Throttled<S>
where
    S: SourceFetcher,
{
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn fetch(&self, query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError> {
        {
            let mut last_issued = self.last_issued.lock().await;
            if let Some(previous) = *last_issued {
                tokio::time::sleep_until(previous + self.min_interval).await;
            }
            *last_issued = Some(Instant::now());
        }

        self.inner.fetch(query).await
    }
}
