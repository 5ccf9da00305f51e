pub mod dto;

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{aggregate, config, scrape::PageSource, time};
use dto::{DayQuery, DayResponse, ErrorResponse, HealthResponse, WeekQuery, WeekResponse};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid date {0:?}, expected YYYY-MM-DD")]
    Date(String),
    #[error("invalid week offset {0:?}")]
    WeekOffset(String),
    #[error("unknown timezone {0:?}")]
    Timezone(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::info!(target: "api", "bad request: {self}");
        let body = ErrorResponse {
            error: self.to_string(),
            timestamp: Utc::now(),
        };
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        timestamp: Utc::now(),
    })
}

/// `GET /api/pool-hours?date=YYYY-MM-DD`
pub async fn day<S>(
    State(source): State<Arc<S>>,
    Query(query): Query<DayQuery>,
) -> Result<(StatusCode, Json<DayResponse>), ApiError>
where
    S: PageSource + Send + Sync + 'static,
{
    let now = Utc::now();
    let date = match present(query.date.as_deref()) {
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ApiError::Date(s.to_owned()))?,
        None => time::site_today(now),
    };

    let result = aggregate::fetch_day(source.as_ref(), date, now).await;
    let status = if result.is_failed() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(DayResponse::new(result, now))))
}

/// `GET /api/pool-hours/week?weekOffset=N&timezone=Area/City`
pub async fn week<S>(
    State(source): State<Arc<S>>,
    Query(query): Query<WeekQuery>,
) -> Result<(StatusCode, Json<WeekResponse>), ApiError>
where
    S: PageSource + Send + Sync + 'static,
{
    let now = Utc::now();
    let offset = match present(query.week_offset.as_deref()) {
        Some(s) => s.parse::<i64>().map_err(|_| ApiError::WeekOffset(s.to_owned()))?,
        None => 0,
    };
    let timezone = present(query.timezone.as_deref()).unwrap_or(config::CLIENT_TIMEZONE);
    let tz: Tz = timezone
        .parse()
        .map_err(|_| ApiError::Timezone(timezone.to_owned()))?;

    let result = aggregate::fetch_week(source.as_ref(), offset, tz, now)
        .await
        .ok_or_else(|| ApiError::WeekOffset(offset.to_string()))?;
    let status = if result.days.iter().all(|d| d.is_failed()) {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };
    Ok((status, Json(WeekResponse::new(result, offset, now))))
}

pub fn router<S>(source: Arc<S>) -> Router
where
    S: PageSource + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/api/pool-hours", get(day::<S>))
        .route("/api/pool-hours/week", get(week::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::very_permissive())
        .with_state(source)
}
