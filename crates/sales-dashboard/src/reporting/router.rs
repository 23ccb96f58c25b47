use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;

use super::domain::{ProducerMetrics, ZipHealth, ZipMetrics};
use super::leaderboard::LeaderboardService;
use super::store::{MetricsStore, StoreError};
use super::zip_health::classify;
use crate::calendar::{AgencyCalendar, Clock, DateRange, DateRangeError};

/// Shared handler state: the roll-up service and the agency calendar.
pub struct ReportingState<S, C> {
    pub service: LeaderboardService<S>,
    pub calendar: Arc<AgencyCalendar<C>>,
}

impl<S, C> Clone for ReportingState<S, C> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            calendar: Arc::clone(&self.calendar),
        }
    }
}

/// Router builder exposing leaderboard, zip health, and calendar endpoints.
pub fn reporting_router<S, C>(state: ReportingState<S, C>) -> Router
where
    S: MetricsStore + 'static,
    C: Clock + 'static,
{
    Router::new()
        .route("/api/v1/leaderboard", get(leaderboard_handler::<S, C>))
        .route("/api/v1/zip-health", get(zip_health_handler::<S, C>))
        .route("/api/v1/zip-health/classify", post(classify_handler))
        .route("/api/v1/calendar", get(calendar_handler::<S, C>))
        .with_state(state)
}

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

impl RangeQuery {
    /// Resolves the requested range, defaulting to the current agency week.
    pub fn resolve<C: Clock>(
        &self,
        calendar: &AgencyCalendar<C>,
    ) -> Result<DateRange, RangeQueryError> {
        match (self.from.as_deref(), self.to.as_deref()) {
            (None, None) => Ok(calendar.current_week()),
            (Some(from), Some(to)) => Ok(DateRange::parse(from, to)?),
            _ => Err(RangeQueryError::Incomplete),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RangeQueryError {
    #[error("from and to must be supplied together")]
    Incomplete,
    #[error(transparent)]
    Range(#[from] DateRangeError),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LeaderboardResponse {
    pub range: DateRange,
    pub range_label: String,
    pub producers: Vec<ProducerMetrics>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ZipHealthResponse {
    pub range: DateRange,
    pub range_label: String,
    pub zips: Vec<ZipMetrics>,
}

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub quotes: i64,
    pub sales: i64,
    #[serde(default)]
    pub conversion_rate: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ClassifyResponse {
    pub health: ZipHealth,
    pub health_label: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CalendarQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CalendarResponse {
    pub timezone: String,
    pub today: NaiveDate,
    pub yesterday: NaiveDate,
    pub default_entry_date: NaiveDate,
    pub date: String,
    pub past_cutoff: bool,
}

pub(crate) async fn leaderboard_handler<S, C>(
    State(state): State<ReportingState<S, C>>,
    Query(query): Query<RangeQuery>,
) -> Response
where
    S: MetricsStore + 'static,
    C: Clock + 'static,
{
    let range = match query.resolve(&*state.calendar) {
        Ok(range) => range,
        Err(err) => return bad_request(err),
    };

    match state.service.producer_metrics(&range) {
        Ok(producers) => {
            let body = LeaderboardResponse {
                range,
                range_label: range.label(),
                producers,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => load_failure("leaderboard", err),
    }
}

pub(crate) async fn zip_health_handler<S, C>(
    State(state): State<ReportingState<S, C>>,
    Query(query): Query<RangeQuery>,
) -> Response
where
    S: MetricsStore + 'static,
    C: Clock + 'static,
{
    let range = match query.resolve(&*state.calendar) {
        Ok(range) => range,
        Err(err) => return bad_request(err),
    };

    match state.service.zip_metrics(&range) {
        Ok(zips) => {
            let body = ZipHealthResponse {
                range,
                range_label: range.label(),
                zips,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(err) => load_failure("zip health", err),
    }
}

pub(crate) async fn classify_handler(Json(request): Json<ClassifyRequest>) -> Json<ClassifyResponse> {
    let health = classify(request.quotes, request.sales, request.conversion_rate);
    Json(ClassifyResponse {
        health,
        health_label: health.label().to_string(),
    })
}

pub(crate) async fn calendar_handler<S, C>(
    State(state): State<ReportingState<S, C>>,
    Query(query): Query<CalendarQuery>,
) -> Json<CalendarResponse>
where
    S: MetricsStore + 'static,
    C: Clock + 'static,
{
    let calendar = &state.calendar;
    let today = calendar.today();
    let date = query.date.unwrap_or_else(|| today.to_string());
    let past_cutoff = calendar.is_past_six_pm(&date);

    Json(CalendarResponse {
        timezone: calendar.timezone().name().to_string(),
        today,
        yesterday: calendar.yesterday(),
        default_entry_date: calendar.default_entry_date(),
        date,
        past_cutoff,
    })
}

fn bad_request(err: RangeQueryError) -> Response {
    let payload = json!({ "error": err.to_string() });
    (StatusCode::BAD_REQUEST, Json(payload)).into_response()
}

fn load_failure(view: &str, err: StoreError) -> Response {
    error!(view, error = %err, "failed to load report");
    let payload = json!({ "error": format!("failed to load {view}") });
    (StatusCode::SERVICE_UNAVAILABLE, Json(payload)).into_response()
}
