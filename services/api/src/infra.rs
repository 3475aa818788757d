use chrono::{DateTime, Utc};
use job_scout::discovery::DiscoveryOrchestrator;
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) orchestrator: Arc<DiscoveryOrchestrator>,
}

/// `--source` value: a source name and the CSV export backing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SourceArg {
    pub(crate) name: String,
    pub(crate) path: PathBuf,
}

pub(crate) fn parse_source_arg(raw: &str) -> Result<SourceArg, String> {
    let (name, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=PATH, got '{raw}'"))?;
    let name = name.trim();
    let path = path.trim();
    if name.is_empty() || path.is_empty() {
        return Err(format!("source name and path must both be set in '{raw}'"));
    }
    Ok(SourceArg {
        name: name.to_string(),
        path: PathBuf::from(path),
    })
}

pub(crate) fn parse_instant(raw: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(raw.trim())
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|err| format!("failed to parse '{raw}' as RFC 3339 ({err})"))
}
