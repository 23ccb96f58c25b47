use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use sales_dashboard::config::AppConfig;
use sales_dashboard::error::AppError;
use sales_dashboard::reporting::SnapshotStore;
use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Loads the activity snapshot from `data`, or from `APP_DATA_PATH` when no
/// override is given. With neither, the store starts empty.
pub(crate) fn load_store(data: Option<PathBuf>) -> Result<SnapshotStore, AppError> {
    let path = match data {
        Some(path) => Some(path),
        None => AppConfig::load()?.store.data_path,
    };
    store_from_path(path)
}

pub(crate) fn store_from_path(path: Option<PathBuf>) -> Result<SnapshotStore, AppError> {
    match path {
        Some(path) => Ok(SnapshotStore::load(&path)?),
        None => {
            warn!("no activity snapshot configured; serving an empty store");
            Ok(SnapshotStore::default())
        }
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    sales_dashboard::calendar::parse_date(raw)
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
