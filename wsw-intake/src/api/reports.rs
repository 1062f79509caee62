//! Report browsing API handlers
//!
//! GET /reports, GET /reports/:id, GET /reports/statistics, GET /reports/map

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;
use wsw_common::stats::{MapPoint, StatisticsSummary};
use wsw_common::Report;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /reports
///
/// Persisted reports, newest first, as of the last refresh.
pub async fn list_reports(State(state): State<AppState>) -> Json<Vec<Report>> {
    Json(state.snapshot.reports().await)
}

/// GET /reports/:id
pub async fn get_report(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Report>> {
    state
        .snapshot
        .find(id)
        .await
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Report {}", id)))
}

/// GET /reports/statistics
///
/// `null` when no report exists yet.
pub async fn get_statistics(State(state): State<AppState>) -> Json<Option<StatisticsSummary>> {
    let summary = state.snapshot.statistics().await;
    if let Some(summary) = &summary {
        tracing::debug!("Statistics: {}", summary.display_string());
    }
    Json(summary)
}

/// GET /reports/map
pub async fn get_map_points(State(state): State<AppState>) -> Json<Vec<MapPoint>> {
    Json(state.snapshot.map_points().await)
}

/// Build report browsing routes
pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports))
        .route("/reports/:id", get(get_report))
        .route("/reports/statistics", get(get_statistics))
        .route("/reports/map", get(get_map_points))
}
