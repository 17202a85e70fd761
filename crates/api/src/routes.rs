use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::middleware::{from_fn, from_fn_with_state};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use db::Repositories;
use prometheus::Encoder;
use tracing::instrument;

use crate::dto::{WeekChartsDto, WeekListDto, WeekSummaryDto};
use crate::error::{ApiError, ApiResult};
use crate::middleware::{cors, track_requests};

pub struct ApiState {
    pub repositories: Arc<dyn Repositories>,
    pub metrics_path: String,
    pub allowed_origins: HashSet<String>,
}

impl ApiState {
    /// `allowed_origins` entries are trimmed; blanks are ignored.
    pub fn new(
        repositories: Arc<dyn Repositories>,
        metrics_path: impl Into<String>,
        allowed_origins: &[String],
    ) -> Self {
        Self {
            repositories,
            metrics_path: metrics_path.into(),
            allowed_origins: allowed_origins
                .iter()
                .map(|o| o.trim())
                .filter(|o| !o.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

pub fn build_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/", get(healthz))
        .route("/healthz", get(healthz))
        .route("/api/weekly", get(list_weeks))
        .route("/api/weekly/:id", get(get_week))
        .route(&state.metrics_path, get(metrics))
        .layer(from_fn_with_state(state.clone(), cors))
        .layer(from_fn(track_requests))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "OK"
}

#[instrument(skip(state))]
async fn list_weeks(State(state): State<Arc<ApiState>>) -> ApiResult<Json<WeekListDto>> {
    let rows = state.repositories.weekly_stats().list_weeks().await?;
    Ok(Json(WeekListDto {
        items: rows.into_iter().map(WeekSummaryDto::from).collect(),
    }))
}

/// Positive integer ids only.
fn parse_week_id(raw: &str) -> ApiResult<i64> {
    raw.trim()
        .parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or(ApiError::InvalidId)
}

#[instrument(skip(state))]
async fn get_week(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<WeekChartsDto>> {
    let id = parse_week_id(&id)?;
    let detail = state
        .repositories
        .weekly_stats()
        .get_week_detail(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(WeekChartsDto::from(detail)))
}

async fn metrics() -> ApiResult<impl IntoResponse> {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    encoder.encode(&prometheus::gather(), &mut buffer)?;
    Ok((
        StatusCode::OK,
        [(header::CONTENT_TYPE, encoder.format_type().to_string())],
        buffer,
    ))
}
