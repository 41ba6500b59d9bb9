// GET handlers: heatmap_data, ts_sum, version, api/status

use std::collections::BTreeMap;

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use super::{ApiError, AppState};
use crate::models::{EntityGroup, MetricItem, is_valid_metric_name};
use crate::pipeline::{HeatmapCsv, OutputStage, SumJson};
use crate::version::{NAME, VERSION};

#[derive(Debug, Deserialize)]
pub(super) struct SeriesParams {
    #[serde(default)]
    entity: String,
    #[serde(default)]
    metric: String,
}

impl SeriesParams {
    /// Checks the metric name before touching the cache, then resolves the entity group.
    fn entity(&self) -> Result<EntityGroup, ApiError> {
        if !is_valid_metric_name(&self.metric) {
            return Err(ApiError::InvalidMetric);
        }
        Ok(self.entity.parse::<EntityGroup>()?)
    }
}

fn render(
    stage: &dyn OutputStage,
    items: &[MetricItem],
    metric: &str,
) -> Result<Response, ApiError> {
    let body = stage.render(items, metric)?;
    Ok(([(header::CONTENT_TYPE, stage.content_type())], body).into_response())
}

/// GET /heatmap_data: 21 `group,variable,value` rows per second-of-day.
pub(super) async fn heatmap_handler(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Response, ApiError> {
    let entity = params.entity()?;
    let snapshot = state.cache.load();
    render(&HeatmapCsv, snapshot.items(entity), &params.metric)
}

/// GET /ts_sum: `{"values": [...]}`, one total per second-of-day.
pub(super) async fn ts_sum_handler(
    State(state): State<AppState>,
    Query(params): Query<SeriesParams>,
) -> Result<Response, ApiError> {
    let entity = params.entity()?;
    let snapshot = state.cache.load();
    render(&SumJson, snapshot.items(entity), &params.metric)
}

/// GET /version: returns service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusResponse {
    fetched_at: Option<i64>,
    polls_ok: u64,
    polls_failed: u64,
    groups: BTreeMap<EntityGroup, usize>,
}

/// GET /api/status: age of the cached snapshot and poll counters.
pub(super) async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.cache.load();
    axum::Json(StatusResponse {
        fetched_at: snapshot.fetched_at,
        polls_ok: state.stats.polls_ok(),
        polls_failed: state.stats.polls_failed(),
        groups: snapshot
            .groups()
            .map(|(group, items)| (group, items.len()))
            .collect(),
    })
}
