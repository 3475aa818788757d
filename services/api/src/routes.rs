use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{DateTime, Utc};
use job_scout::discovery::domain::{DEFAULT_LIMIT, DEFAULT_MAX_AGE_DAYS};
use job_scout::discovery::{
    CancellationToken, CandidateItem, DiscoveryResult, SearchMode, SearchRequest, SourceFetcher,
    StaticSource,
};
use job_scout::error::AppError;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub(crate) struct DiscoverRequest {
    pub(crate) keywords: Vec<String>,
    pub(crate) mode: SearchMode,
    #[serde(default)]
    pub(crate) location: Option<String>,
    #[serde(default)]
    pub(crate) remote_only: bool,
    #[serde(default)]
    pub(crate) max_age_days: Option<u32>,
    #[serde(default)]
    pub(crate) limit: Option<usize>,
    /// Evaluation instant; the server clock when omitted.
    #[serde(default)]
    pub(crate) now: Option<DateTime<Utc>>,
    /// Candidate lists per source, in priority order.
    #[serde(default)]
    pub(crate) sources: Vec<InlineSource>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct InlineSource {
    pub(crate) name: String,
    #[serde(default)]
    pub(crate) items: Vec<CandidateItem>,
}

impl DiscoverRequest {
    fn search_request(&self) -> SearchRequest {
        let request = SearchRequest::new(self.keywords.iter().map(String::as_str), self.mode)
            .remote_only(self.remote_only)
            .with_max_age_days(self.max_age_days.unwrap_or(DEFAULT_MAX_AGE_DAYS))
            .with_limit(self.limit.unwrap_or(DEFAULT_LIMIT));
        match &self.location {
            Some(location) => request.with_location(location.as_str()),
            None => request,
        }
    }
}

pub(crate) fn discovery_routes() -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/discover", axum::routing::post(discover_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn discover_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<DiscoverRequest>,
) -> Result<Json<DiscoveryResult>, AppError> {
    let request = payload.search_request();
    let now = payload.now.unwrap_or_else(Utc::now);
    let sources: Vec<Arc<dyn SourceFetcher>> = payload
        .sources
        .into_iter()
        .map(|source| {
            Arc::new(StaticSource::new(source.name, source.items)) as Arc<dyn SourceFetcher>
        })
        .collect();

    let result = state
        .orchestrator
        .discover_at(&request, &sources, now, &CancellationToken::new())
        .await?;

    info!(
        sources = sources.len(),
        accepted = result.items.len(),
        "discover request served"
    );
    Ok(Json(result))
}
