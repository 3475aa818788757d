use crate::infra::{parse_instant, parse_source_arg, SourceArg};
use chrono::{DateTime, Utc};
use clap::Args;
use job_scout::config::AppConfig;
use job_scout::discovery::{
    CancellationToken, CsvCandidateImporter, DiscoveryOrchestrator, DiscoveryResult,
    SearchMode, SearchRequest, SourceFetcher,
};
use job_scout::error::AppError;
use job_scout::telemetry;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct DiscoverArgs {
    /// Keyword phrase to search for (repeatable)
    #[arg(long, required = true)]
    pub(crate) keyword: Vec<String>,
    /// Matching mode: strict, moderate, or loose
    #[arg(long, default_value = "moderate")]
    pub(crate) mode: SearchMode,
    /// Only keep postings mentioning this location (remote postings always pass)
    #[arg(long)]
    pub(crate) location: Option<String>,
    /// Drop postings without a remote signal
    #[arg(long)]
    pub(crate) remote_only: bool,
    /// Ignore postings older than this many days
    #[arg(long, default_value_t = 30)]
    pub(crate) max_age_days: u32,
    /// Maximum number of results to print
    #[arg(long, default_value_t = 50)]
    pub(crate) limit: usize,
    /// CSV export as NAME=PATH, in priority order (repeatable)
    #[arg(long, required = true, value_parser = parse_source_arg)]
    pub(crate) source: Vec<SourceArg>,
    /// JSON vocabulary file overriding the configured one
    #[arg(long)]
    pub(crate) vocabulary: Option<PathBuf>,
    /// Evaluation instant (RFC 3339). Defaults to now.
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Print the score breakdown for every result
    #[arg(long)]
    pub(crate) explain: bool,
}

pub(crate) async fn run_discover(args: DiscoverArgs) -> Result<(), AppError> {
    let DiscoverArgs {
        keyword,
        mode,
        location,
        remote_only,
        max_age_days,
        limit,
        source,
        vocabulary,
        now,
        explain,
    } = args;

    let mut config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    if let Some(path) = vocabulary {
        config.discovery.vocabulary_path = Some(path);
    }
    let vocabulary = Arc::new(config.discovery.load_vocabulary()?);
    let orchestrator = DiscoveryOrchestrator::from_config(&config.discovery, vocabulary);

    let mut sources: Vec<Arc<dyn SourceFetcher>> = Vec::with_capacity(source.len());
    for SourceArg { name, path } in source {
        sources.push(Arc::new(CsvCandidateImporter::from_path(&name, &path)?));
    }

    let mut request = SearchRequest::new(keyword, mode)
        .remote_only(remote_only)
        .with_max_age_days(max_age_days)
        .with_limit(limit);
    if let Some(location) = location {
        request = request.with_location(location);
    }

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_interrupt.cancel();
        }
    });

    let now = now.unwrap_or_else(Utc::now);
    let result = orchestrator
        .discover_at(&request, &sources, now, &cancel)
        .await?;

    render_discovery(&request, &result, now, explain);
    Ok(())
}

pub(crate) fn render_discovery(
    request: &SearchRequest,
    result: &DiscoveryResult,
    now: DateTime<Utc>,
    explain: bool,
) {
    let keywords: Vec<&str> = request.keywords.iter().map(|k| k.phrase()).collect();
    println!("Job discovery");
    println!(
        "Keywords: {} ({} mode, evaluated {})",
        keywords.join(", "),
        request.mode,
        now.to_rfc3339()
    );
    if let Some(location) = &request.location {
        println!("Location: {location}");
    }
    if request.remote_only {
        println!("Remote only");
    }
    println!(
        "Status: {} ({} candidates seen, {} accepted)",
        result.status.label(),
        result.total_candidates_seen,
        result.items.len()
    );

    if result.items.is_empty() {
        println!("\nResults: none");
    } else {
        println!("\nResults");
        for (rank, item) in result.items.iter().enumerate() {
            let candidate = &item.candidate;
            println!(
                "{}. [{:.2}] {} ({}, {}){}",
                rank + 1,
                item.relevance_score,
                candidate.title,
                candidate.source_name,
                candidate.created_at.format("%Y-%m-%d"),
                if item.is_remote { " remote" } else { "" }
            );
            println!("   matched: {}", item.matched_keywords.join(", "));
            if !candidate.source_url.is_empty() {
                println!("   {}", candidate.source_url);
            }
            if explain {
                for component in &item.components {
                    println!(
                        "   - {:?}: +{:.2} {}",
                        component.signal, component.score, component.notes
                    );
                }
            }
        }
    }

    if !result.rejections.is_empty() {
        println!("\nRejected");
        for (reason, count) in &result.rejections {
            println!("- {}: {}", reason.label(), count);
        }
    }

    if !result.per_source_errors.is_empty() {
        println!("\nSource errors");
        for (source, error) in &result.per_source_errors {
            println!("- {source}: {error}");
        }
    }
}
