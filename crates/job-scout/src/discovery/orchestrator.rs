use chrono::{DateTime, Duration as ChronoDuration, Utc};
use futures::stream::{self, StreamExt};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::dedupe::Deduplicator;
use super::domain::{
    CandidateItem, DiscoveryResult, DiscoveryStage, DiscoveryStatus, InvalidRequestError,
    RejectionReason, ScoredItem, SearchRequest,
};
use super::location::{LocationAssessment, LocationClassifier};
use super::normalizer::normalize_corpus;
use super::scoring::{
    AcceptanceDecision, ModeThresholds, RelevanceConfig, RelevanceEngine, RelevanceOutcome,
};
use super::source::{FetchQuery, SourceFetchError, SourceFetcher};
use super::vocabulary::VocabularyTable;
use crate::config::DiscoveryConfig;

pub const DEFAULT_SOURCE_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_MAX_CONCURRENT_SOURCES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrchestratorSettings {
    /// Independent per-source bound; one slow source never cancels another.
    pub source_timeout: Duration,
    pub max_concurrent_sources: usize,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            source_timeout: DEFAULT_SOURCE_TIMEOUT,
            max_concurrent_sources: DEFAULT_MAX_CONCURRENT_SOURCES,
        }
    }
}

/// Drives fetch, normalize, classify, score, threshold, and dedupe for one
/// search request at a time. Holds only read-only state, so a single
/// instance can serve concurrent requests.
#[derive(Debug, Clone)]
pub struct DiscoveryOrchestrator {
    engine: RelevanceEngine,
    classifier: LocationClassifier,
    settings: OrchestratorSettings,
}

struct SourceOutcome {
    name: String,
    result: Result<Vec<CandidateItem>, SourceFetchError>,
}

struct Evaluated {
    candidate: CandidateItem,
    location: LocationAssessment,
    outcome: RelevanceOutcome,
}

struct DiscoveryRun {
    stage: DiscoveryStage,
    trace: Vec<DiscoveryStage>,
}

impl DiscoveryRun {
    fn new() -> Self {
        Self {
            stage: DiscoveryStage::Pending,
            trace: vec![DiscoveryStage::Pending],
        }
    }

    fn advance(&mut self) {
        if let Some(next) = self.stage.successor() {
            debug!(from = self.stage.label(), to = next.label(), "discovery stage");
            self.stage = next;
            self.trace.push(next);
        }
    }
}

impl DiscoveryOrchestrator {
    pub fn new(
        vocabulary: Arc<VocabularyTable>,
        relevance: RelevanceConfig,
        thresholds: ModeThresholds,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            engine: RelevanceEngine::new(vocabulary.clone(), relevance, thresholds),
            classifier: LocationClassifier::new(vocabulary),
            settings,
        }
    }

    pub fn with_defaults(vocabulary: Arc<VocabularyTable>) -> Self {
        Self::new(
            vocabulary,
            RelevanceConfig::default(),
            ModeThresholds::default(),
            OrchestratorSettings::default(),
        )
    }

    pub fn from_config(config: &DiscoveryConfig, vocabulary: Arc<VocabularyTable>) -> Self {
        Self::new(
            vocabulary,
            config.relevance.clone(),
            config.thresholds,
            config.settings(),
        )
    }

    pub fn settings(&self) -> &OrchestratorSettings {
        &self.settings
    }

    pub async fn discover(
        &self,
        request: &SearchRequest,
        sources: &[Arc<dyn SourceFetcher>],
    ) -> Result<DiscoveryResult, InvalidRequestError> {
        self.discover_at(request, sources, Utc::now(), &CancellationToken::new())
            .await
    }

    /// Sources are listed in priority order: their results are merged in that
    /// order regardless of which responds first, so earlier sources win
    /// deduplication ties. Every item is attributed to the fetcher that
    /// returned it, whatever `source_name` the fetcher filled in.
    pub async fn discover_at(
        &self,
        request: &SearchRequest,
        sources: &[Arc<dyn SourceFetcher>],
        now: DateTime<Utc>,
        cancel: &CancellationToken,
    ) -> Result<DiscoveryResult, InvalidRequestError> {
        request.validate()?;

        let mut run = DiscoveryRun::new();
        run.advance();
        let fetched = self.fetch_all(request, sources, cancel).await;

        let mut per_source_errors = BTreeMap::new();
        let mut candidates = Vec::new();
        let mut succeeded = 0usize;
        let mut cancelled = false;
        for SourceOutcome { name, result } in fetched {
            match result {
                Ok(items) => {
                    debug!(source = %name, count = items.len(), "source fetched");
                    succeeded += 1;
                    candidates.extend(items.into_iter().map(|mut item| {
                        item.source_name = name.clone();
                        item
                    }));
                }
                Err(err) => {
                    cancelled |= err == SourceFetchError::Cancelled;
                    warn!(source = %name, error = %err, "source fetch failed");
                    per_source_errors.insert(name, err.to_string());
                }
            }
        }

        let status = if cancelled {
            DiscoveryStatus::Cancelled
        } else if per_source_errors.is_empty() {
            DiscoveryStatus::Complete
        } else if succeeded == 0 {
            DiscoveryStatus::Failed
        } else {
            DiscoveryStatus::PartialFailure
        };
        let total_candidates_seen = candidates.len();

        run.advance();
        let normalized: Vec<(CandidateItem, String)> = candidates
            .into_iter()
            .map(|candidate| {
                let corpus = normalize_corpus(&candidate.title, &candidate.body);
                (candidate, corpus)
            })
            .collect();

        run.advance();
        let mut rejections: BTreeMap<RejectionReason, usize> = BTreeMap::new();
        let max_age = ChronoDuration::days(i64::from(request.max_age_days));
        let mut evaluated = Vec::with_capacity(normalized.len());
        for (candidate, corpus) in normalized {
            if now.signed_duration_since(candidate.created_at) > max_age {
                *rejections.entry(RejectionReason::Expired).or_default() += 1;
                continue;
            }

            let location = self.classifier.classify(&corpus, request);
            if location.rejects_before_scoring() {
                *rejections.entry(RejectionReason::NotRemote).or_default() += 1;
                continue;
            }

            let outcome = self
                .engine
                .score(&corpus, &candidate, request, &location, now);
            evaluated.push(Evaluated {
                candidate,
                location,
                outcome,
            });
        }

        run.advance();
        let mut accepted = Vec::with_capacity(evaluated.len());
        for Evaluated {
            candidate,
            location,
            outcome,
        } in evaluated
        {
            match self.engine.decide(&outcome, request, &location) {
                AcceptanceDecision::Accepted => accepted.push(ScoredItem {
                    candidate,
                    relevance_score: outcome.score,
                    matched_mode: request.mode,
                    matched_keywords: outcome.matched_keywords,
                    is_remote: location.is_remote,
                    location_match: location.location_match,
                    accepted_at: now,
                    components: outcome.components,
                }),
                AcceptanceDecision::Rejected(reason) => {
                    *rejections.entry(reason).or_default() += 1;
                }
            }
        }

        run.advance();
        let accepted_count = accepted.len();
        let mut items = Deduplicator::dedupe(accepted);
        let duplicates = accepted_count - items.len();
        if duplicates > 0 {
            rejections.insert(RejectionReason::Duplicate, duplicates);
        }

        items.sort_by(|a, b| {
            b.relevance_score
                .total_cmp(&a.relevance_score)
                .then_with(|| b.candidate.created_at.cmp(&a.candidate.created_at))
        });
        items.truncate(request.limit);

        run.advance();
        info!(
            mode = %request.mode,
            status = status.label(),
            seen = total_candidates_seen,
            accepted = items.len(),
            failed_sources = per_source_errors.len(),
            "discovery finished"
        );

        Ok(DiscoveryResult {
            items,
            total_candidates_seen,
            per_source_errors,
            status,
            stages: run.trace,
            rejections,
        })
    }

    async fn fetch_all(
        &self,
        request: &SearchRequest,
        sources: &[Arc<dyn SourceFetcher>],
        cancel: &CancellationToken,
    ) -> Vec<SourceOutcome> {
        let query = FetchQuery::from(request);
        let query = &query;
        let timeout = self.settings.source_timeout;

        let fetches: Vec<_> = sources
            .iter()
            .map(|source| async move {
                let name = source.name().to_string();
                if cancel.is_cancelled() {
                    return SourceOutcome {
                        name,
                        result: Err(SourceFetchError::Cancelled),
                    };
                }

                let result = match tokio::time::timeout(timeout, source.fetch(query)).await {
                    Ok(result) => result,
                    Err(_) => Err(SourceFetchError::Timeout(timeout)),
                };
                SourceOutcome { name, result }
            })
            .collect();

        stream::iter(fetches)
            .buffered(self.settings.max_concurrent_sources.max(1))
            .collect::<Vec<_>>()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::domain::SearchMode;
    use crate::discovery::source::StaticSource;
    use async_trait::async_trait;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0).unwrap()
    }

    fn item(id: &str, title: &str, body: &str) -> CandidateItem {
        CandidateItem {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            source_name: String::new(),
            created_at: now() - ChronoDuration::days(3),
            upvote_count: None,
            comment_count: None,
            source_url: String::new(),
        }
    }

    #[derive(Debug)]
    struct FailingSource;

    #[async_trait]
    impl SourceFetcher for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch(
            &self,
            _query: &FetchQuery,
        ) -> Result<Vec<CandidateItem>, SourceFetchError> {
            Err(SourceFetchError::Network("connection reset".to_string()))
        }
    }

    #[derive(Debug)]
    struct UnlabelledSource {
        name: &'static str,
        title: &'static str,
    }

    #[async_trait]
    impl SourceFetcher for UnlabelledSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(
            &self,
            _query: &FetchQuery,
        ) -> Result<Vec<CandidateItem>, SourceFetchError> {
            Ok(vec![item("1", self.title, "Remote team")])
        }
    }

    fn orchestrator() -> DiscoveryOrchestrator {
        DiscoveryOrchestrator::with_defaults(Arc::new(VocabularyTable::standard()))
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_fetching() {
        let request = SearchRequest::new(["rust"], SearchMode::Loose).with_limit(0);
        let error = orchestrator()
            .discover_at(&request, &[], now(), &CancellationToken::new())
            .await
            .expect_err("zero limit rejected");
        assert_eq!(error, InvalidRequestError::NonPositiveLimit);
    }

    #[tokio::test]
    async fn stages_are_visited_in_order() {
        let request = SearchRequest::new(["rust"], SearchMode::Loose);
        let result = orchestrator()
            .discover_at(&request, &[], now(), &CancellationToken::new())
            .await
            .expect("discovery runs");
        assert_eq!(result.stages, DiscoveryStage::ordered().to_vec());
        assert_eq!(result.status, DiscoveryStatus::Complete);
        assert!(result.items.is_empty());
    }

    #[tokio::test]
    async fn failing_source_is_isolated() {
        let sources: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(FailingSource),
            Arc::new(StaticSource::new(
                "board",
                vec![item("1", "Rust developer", "Build APIs")],
            )),
        ];
        let request = SearchRequest::new(["rust developer"], SearchMode::Moderate);

        let result = orchestrator()
            .discover_at(&request, &sources, now(), &CancellationToken::new())
            .await
            .expect("discovery runs");

        assert_eq!(result.status, DiscoveryStatus::PartialFailure);
        assert_eq!(result.items.len(), 1);
        assert_eq!(
            result.per_source_errors.get("broken").map(String::as_str),
            Some("network failure: connection reset")
        );
    }

    #[tokio::test]
    async fn rejection_counts_are_reported() {
        let sources: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(StaticSource::new(
            "board",
            vec![
                item("1", "Rust developer", "remote"),
                item("2", "Rust developer", "on-site in Austin"),
                {
                    let mut old = item("3", "Old rust developer post", "remote");
                    old.created_at = now() - ChronoDuration::days(90);
                    old
                },
                item("4", "Rust developer", "remote, duplicate title"),
            ],
        ))];
        let request = SearchRequest::new(["rust developer"], SearchMode::Moderate).remote_only(true);

        let result = orchestrator()
            .discover_at(&request, &sources, now(), &CancellationToken::new())
            .await
            .expect("discovery runs");

        assert_eq!(result.total_candidates_seen, 4);
        assert_eq!(result.items.len(), 1);
        assert_eq!(result.items[0].candidate.id, "1");
        assert_eq!(result.rejections.get(&RejectionReason::NotRemote), Some(&1));
        assert_eq!(result.rejections.get(&RejectionReason::Expired), Some(&1));
        assert_eq!(result.rejections.get(&RejectionReason::Duplicate), Some(&1));
    }

    #[tokio::test]
    async fn items_are_attributed_to_the_fetching_source() {
        let sources: Vec<Arc<dyn SourceFetcher>> = vec![
            Arc::new(UnlabelledSource {
                name: "forum",
                title: "Rust developer A",
            }),
            Arc::new(UnlabelledSource {
                name: "board",
                title: "Rust developer B",
            }),
        ];
        let request = SearchRequest::new(["rust developer"], SearchMode::Moderate);

        let result = orchestrator()
            .discover_at(&request, &sources, now(), &CancellationToken::new())
            .await
            .expect("discovery runs");

        let sources: Vec<_> = result
            .items
            .iter()
            .map(|item| item.candidate.source_name.as_str())
            .collect();
        assert_eq!(result.items.len(), 2);
        assert!(sources.contains(&"forum"));
        assert!(sources.contains(&"board"));
        assert!(!result.rejections.contains_key(&RejectionReason::Duplicate));
    }
}
