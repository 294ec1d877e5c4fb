use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryBoardStore};
use crate::routes::with_dashboard_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use job_board::config::AppConfig;
use job_board::error::AppError;
use job_board::telemetry;
use job_board::workflows::dashboard::{BoardSource, DashboardService, HttpBoardSource};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    match config.board.base_url.clone() {
        Some(base_url) => {
            info!(%base_url, "using remote job board");
            let source = HttpBoardSource::new(&base_url)?;
            serve(config, Arc::new(source)).await
        }
        None => {
            warn!("JOBBOARD_API_BASE_URL not set, serving seeded in-memory board");
            serve(config, Arc::new(InMemoryBoardStore::seeded())).await
        }
    }
}

async fn serve<S>(config: AppConfig, source: Arc<S>) -> Result<(), AppError>
where
    S: BoardSource + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let dashboard_service = Arc::new(DashboardService::from_config(source, &config));

    let app = with_dashboard_routes(dashboard_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}
