use crate::cli::ServeArgs;
use crate::infra::{store_from_path, AppState};
use crate::routes::with_reporting_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use sales_dashboard::calendar::AgencyCalendar;
use sales_dashboard::config::AppConfig;
use sales_dashboard::error::AppError;
use sales_dashboard::reporting::{LeaderboardService, ReportingState};
use sales_dashboard::telemetry;
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

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let store = Arc::new(store_from_path(config.store.data_path.clone())?);
    let reporting = ReportingState {
        service: LeaderboardService::new(store),
        calendar: Arc::new(AgencyCalendar::system()),
    };

    let app = with_reporting_routes(reporting)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "sales dashboard ready");

    axum::serve(listener, app).await?;
    Ok(())
}
