use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::discovery_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_scout::config::AppConfig;
use job_scout::discovery::DiscoveryOrchestrator;
use job_scout::error::AppError;
use job_scout::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let vocabulary = Arc::new(config.discovery.load_vocabulary()?);
    info!(
        terms = vocabulary.term_count(),
        custom = config.discovery.vocabulary_path.is_some(),
        "vocabulary loaded"
    );
    let orchestrator = DiscoveryOrchestrator::from_config(&config.discovery, vocabulary);

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        orchestrator: Arc::new(orchestrator),
    };

    let app = discovery_routes()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job discovery service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
