use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, TimeZone, Utc};
use job_scout::discovery::{
    CancellationToken, CandidateItem, CsvCandidateImporter, DiscoveryOrchestrator,
    DiscoveryStatus, FetchQuery, ModeThresholds, OrchestratorSettings, RejectionReason,
    RelevanceConfig, SearchMode, SearchRequest, SourceFetchError, SourceFetcher, StaticSource,
    VocabularyTable,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const WORDPRESS_POSTING: (&str, &str) = (
    "PHP Web Developer Needed",
    "Looking for a PHP developer with WordPress experience. WP theme customization required.",
);
const FRONTEND_POSTING: (&str, &str) = (
    "Frontend Developer",
    "React/Vue. Some CMS experience preferred.",
);

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 10, 1, 12, 0, 0)
        .single()
        .expect("valid clock")
}

fn candidate(id: &str, (title, body): (&str, &str)) -> CandidateItem {
    CandidateItem {
        id: id.to_string(),
        title: title.to_string(),
        body: body.to_string(),
        source_name: String::new(),
        created_at: now() - ChronoDuration::days(3),
        upvote_count: None,
        comment_count: None,
        source_url: format!("https://example.com/{id}"),
    }
}

fn orchestrator() -> DiscoveryOrchestrator {
    DiscoveryOrchestrator::with_defaults(Arc::new(VocabularyTable::standard()))
}

fn orchestrator_with(settings: OrchestratorSettings) -> DiscoveryOrchestrator {
    DiscoveryOrchestrator::new(
        Arc::new(VocabularyTable::standard()),
        RelevanceConfig::default(),
        ModeThresholds::default(),
        settings,
    )
}

fn static_source(name: &str, items: Vec<CandidateItem>) -> Arc<dyn SourceFetcher> {
    Arc::new(StaticSource::new(name, items))
}

async fn run(
    orchestrator: &DiscoveryOrchestrator,
    request: &SearchRequest,
    sources: &[Arc<dyn SourceFetcher>],
) -> job_scout::discovery::DiscoveryResult {
    orchestrator
        .discover_at(request, sources, now(), &CancellationToken::new())
        .await
        .expect("valid request")
}

#[derive(Debug)]
struct SlowSource {
    name: &'static str,
    delay: Duration,
    items: Vec<CandidateItem>,
}

#[async_trait]
impl SourceFetcher for SlowSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError> {
        tokio::time::sleep(self.delay).await;
        Ok(self
            .items
            .iter()
            .cloned()
            .map(|mut item| {
                item.source_name = self.name.to_string();
                item
            })
            .collect())
    }
}

#[derive(Debug, Default)]
struct CountingSource {
    calls: AtomicUsize,
}

#[async_trait]
impl SourceFetcher for CountingSource {
    fn name(&self) -> &str {
        "counting"
    }

    async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Vec::new())
    }
}

#[derive(Debug)]
struct BrokenSource(&'static str);

#[async_trait]
impl SourceFetcher for BrokenSource {
    fn name(&self) -> &str {
        self.0
    }

    async fn fetch(&self, _query: &FetchQuery) -> Result<Vec<CandidateItem>, SourceFetchError> {
        Err(SourceFetchError::Parse("unexpected html".to_string()))
    }
}

#[tokio::test]
async fn synonym_match_depends_on_mode() {
    let sources = vec![static_source(
        "forum",
        vec![candidate("a", WORDPRESS_POSTING)],
    )];

    let strict = run(
        &orchestrator(),
        &SearchRequest::new(["WordPress developer"], SearchMode::Strict),
        &sources,
    )
    .await;
    assert!(strict.items.is_empty());
    assert_eq!(
        strict.rejections.get(&RejectionReason::NoKeywordMatch),
        Some(&1)
    );

    for mode in [SearchMode::Moderate, SearchMode::Loose] {
        let result = run(
            &orchestrator(),
            &SearchRequest::new(["WordPress developer"], mode),
            &sources,
        )
        .await;
        assert_eq!(result.items.len(), 1, "{mode} should accept the posting");
        assert_eq!(result.items[0].matched_mode, mode);
        assert_eq!(result.items[0].matched_keywords, vec!["WordPress developer"]);
    }
}

#[tokio::test]
async fn category_terms_only_satisfy_loose_mode() {
    let sources = vec![static_source(
        "forum",
        vec![candidate("b", FRONTEND_POSTING)],
    )];

    let moderate = run(
        &orchestrator(),
        &SearchRequest::new(["WordPress developer"], SearchMode::Moderate),
        &sources,
    )
    .await;
    assert!(moderate.items.is_empty());

    let loose = run(
        &orchestrator(),
        &SearchRequest::new(["WordPress developer"], SearchMode::Loose),
        &sources,
    )
    .await;
    assert_eq!(loose.items.len(), 1);
    assert!(loose.items[0].relevance_score >= ModeThresholds::default().loose);
}

#[tokio::test]
async fn duplicate_titles_keep_the_higher_priority_source() {
    let sources = vec![
        static_source("job-board", vec![candidate("1", WORDPRESS_POSTING)]),
        static_source(
            "forum",
            vec![candidate(
                "t3_x",
                ("  php web developer   NEEDED ", WORDPRESS_POSTING.1),
            )],
        ),
    ];

    let result = run(
        &orchestrator(),
        &SearchRequest::new(["WordPress developer"], SearchMode::Loose),
        &sources,
    )
    .await;

    assert_eq!(result.total_candidates_seen, 2);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].candidate.source_name, "job-board");
    assert_eq!(result.rejections.get(&RejectionReason::Duplicate), Some(&1));
}

#[tokio::test]
async fn remote_only_excludes_postings_without_remote_signal() {
    let sources = vec![static_source(
        "forum",
        vec![
            candidate("onsite", WORDPRESS_POSTING),
            candidate(
                "remote",
                (
                    "WordPress developer (remote)",
                    "Fully remote WordPress developer role.",
                ),
            ),
        ],
    )];
    let request = SearchRequest::new(["WordPress developer"], SearchMode::Loose).remote_only(true);

    let result = run(&orchestrator(), &request, &sources).await;

    let ids: Vec<_> = result
        .items
        .iter()
        .map(|item| item.candidate.id.as_str())
        .collect();
    assert_eq!(ids, vec!["remote"]);
    assert!(result.items[0].is_remote);
    assert_eq!(result.rejections.get(&RejectionReason::NotRemote), Some(&1));
}

#[tokio::test]
async fn identical_inputs_produce_identical_results() {
    let sources = vec![
        static_source(
            "job-board",
            vec![
                candidate("1", WORDPRESS_POSTING),
                candidate("2", FRONTEND_POSTING),
            ],
        ),
        static_source(
            "forum",
            vec![candidate(
                "3",
                ("Remote WordPress developer", "$45/hr, remote friendly"),
            )],
        ),
    ];
    let request = SearchRequest::new(["WordPress developer", "react"], SearchMode::Loose);

    let first = run(&orchestrator(), &request, &sources).await;
    let second = run(&orchestrator(), &request, &sources).await;

    let first_json = serde_json::to_string(&first).expect("serializes");
    let second_json = serde_json::to_string(&second).expect("serializes");
    assert_eq!(first_json, second_json);
}

#[tokio::test]
async fn results_are_ranked_and_truncated_to_the_limit() {
    let sources = vec![static_source(
        "forum",
        vec![
            candidate("partial", FRONTEND_POSTING),
            candidate(
                "exact",
                ("WordPress developer", "Remote WordPress developer, $60/hr"),
            ),
            candidate("synonym", WORDPRESS_POSTING),
        ],
    )];
    let request = SearchRequest::new(["WordPress developer"], SearchMode::Loose).with_limit(2);

    let result = run(&orchestrator(), &request, &sources).await;

    let ids: Vec<_> = result
        .items
        .iter()
        .map(|item| item.candidate.id.as_str())
        .collect();
    assert_eq!(ids, vec!["exact", "synonym"]);
    assert!(result.items[0].relevance_score > result.items[1].relevance_score);
    assert_eq!(result.total_candidates_seen, 3);
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out_without_affecting_others() {
    let sources: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(SlowSource {
            name: "stalled",
            delay: Duration::from_secs(120),
            items: vec![candidate("late", WORDPRESS_POSTING)],
        }),
        static_source("job-board", vec![candidate("1", WORDPRESS_POSTING)]),
    ];
    let request = SearchRequest::new(["WordPress developer"], SearchMode::Moderate);

    let result = run(
        &orchestrator_with(OrchestratorSettings {
            source_timeout: Duration::from_secs(5),
            max_concurrent_sources: 4,
        }),
        &request,
        &sources,
    )
    .await;

    assert_eq!(result.status, DiscoveryStatus::PartialFailure);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].candidate.source_name, "job-board");
    assert_eq!(
        result.per_source_errors.get("stalled").map(String::as_str),
        Some("timed out after 5000ms")
    );
}

#[tokio::test(start_paused = true)]
async fn merge_order_follows_source_priority_not_arrival() {
    let sources: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(SlowSource {
            name: "priority",
            delay: Duration::from_secs(3),
            items: vec![candidate("slow", WORDPRESS_POSTING)],
        }),
        static_source("fast", vec![candidate("quick", WORDPRESS_POSTING)]),
    ];
    let request = SearchRequest::new(["WordPress developer"], SearchMode::Moderate);

    let result = run(&orchestrator(), &request, &sources).await;

    assert_eq!(result.status, DiscoveryStatus::Complete);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].candidate.source_name, "priority");
}

#[tokio::test]
async fn cancelled_discovery_skips_fetching() {
    let counting = Arc::new(CountingSource::default());
    let sources: Vec<Arc<dyn SourceFetcher>> = vec![counting.clone()];
    let token = CancellationToken::new();
    token.cancel();

    let result = orchestrator()
        .discover_at(
            &SearchRequest::new(["rust"], SearchMode::Loose),
            &sources,
            now(),
            &token,
        )
        .await
        .expect("valid request");

    assert_eq!(result.status, DiscoveryStatus::Cancelled);
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert!(result.items.is_empty());
    assert!(result.per_source_errors.contains_key("counting"));
}

#[tokio::test(start_paused = true)]
async fn cancellation_lets_in_flight_fetches_finish_and_skips_the_rest() {
    let counting = Arc::new(CountingSource::default());
    let sources: Vec<Arc<dyn SourceFetcher>> = vec![
        Arc::new(SlowSource {
            name: "first",
            delay: Duration::from_secs(10),
            items: vec![candidate("1", WORDPRESS_POSTING)],
        }),
        counting.clone(),
    ];
    let orchestrator = orchestrator_with(OrchestratorSettings {
        source_timeout: Duration::from_secs(30),
        max_concurrent_sources: 1,
    });
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        canceller.cancel();
    });

    let result = orchestrator
        .discover_at(
            &SearchRequest::new(["WordPress developer"], SearchMode::Moderate),
            &sources,
            now(),
            &token,
        )
        .await
        .expect("valid request");

    assert_eq!(result.status, DiscoveryStatus::Cancelled);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].candidate.source_name, "first");
    assert_eq!(counting.calls.load(Ordering::SeqCst), 0);
    assert_eq!(
        result.per_source_errors.get("counting").map(String::as_str),
        Some("cancelled before the request was issued")
    );
    assert!(!result.per_source_errors.contains_key("first"));
}

#[tokio::test]
async fn every_source_failing_yields_failed_status() {
    let sources: Vec<Arc<dyn SourceFetcher>> =
        vec![Arc::new(BrokenSource("forum")), Arc::new(BrokenSource("board"))];

    let result = run(
        &orchestrator(),
        &SearchRequest::new(["rust"], SearchMode::Loose),
        &sources,
    )
    .await;

    assert_eq!(result.status, DiscoveryStatus::Failed);
    assert!(result.items.is_empty());
    assert_eq!(result.per_source_errors.len(), 2);
    assert_eq!(result.total_candidates_seen, 0);
}

#[tokio::test]
async fn csv_export_feeds_the_pipeline() {
    let csv = "id,title,body,created_at,upvotes,comments,url\n\
t3_a,WordPress developer wanted,Remote. $50/hr,2025-09-30T09:00:00Z,8,2,https://example.com/a\n\
t3_b,Office manager,On-site admin role,2025-09-30T09:00:00Z,,,\n\
t3_c,WP theme fixes,Quick wordpress developer gig,2025-06-01T09:00:00Z,,,\n";
    let source = CsvCandidateImporter::from_reader("forum", csv.as_bytes()).expect("csv imports");
    let sources: Vec<Arc<dyn SourceFetcher>> = vec![Arc::new(source)];
    let request = SearchRequest::new(["WordPress developer"], SearchMode::Moderate);

    let result = run(&orchestrator(), &request, &sources).await;

    assert_eq!(result.total_candidates_seen, 3);
    assert_eq!(result.items.len(), 1);
    assert_eq!(result.items[0].candidate.id, "t3_a");
    assert_eq!(result.items[0].candidate.upvote_count, Some(8));
    assert_eq!(result.rejections.get(&RejectionReason::Expired), Some(&1));
    assert_eq!(
        result.rejections.get(&RejectionReason::NoKeywordMatch),
        Some(&1)
    );
}
