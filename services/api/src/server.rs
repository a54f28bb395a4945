use crate::cli::ServeArgs;
use crate::infra::{self, AppState};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use rentivo::config::AppConfig;
use rentivo::error::AppError;
use rentivo::http::{api_router, ApiState};
use rentivo::telemetry;
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
    if let Some(path) = args.data_file.take() {
        config.storage.data_file = Some(path);
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repositories = infra::repositories(&config.storage)?;
    let api = api_router(ApiState::new(repositories, config.domain));

    let app = with_operational_routes(api)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        invoice_transitions = ?config.domain.invoice_transitions,
        session_ttl_minutes = config.domain.session_ttl.num_minutes(),
        "rentivo api ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
