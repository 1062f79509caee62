//! Submission workflow API handlers
//!
//! GET /submission, POST /submission/photo, POST /submission/location,
//! POST /submission/location/skip, PUT /submission/species, POST /submission/submit,
//! POST /submission/reset

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wsw_common::{Report, ReportDraft};

use crate::{
    error::ApiResult,
    models::{PhotoUpload, SubmissionDetails, SubmissionState},
    services::{Classification, LocateOutcome, ReportedPosition, SubmissionWorkflow},
    AppState,
};

/// Largest accepted photo body
pub const MAX_PHOTO_BYTES: usize = 20 * 1024 * 1024;

/// Current workflow state as seen by the client
#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub state: SubmissionState,
    pub draft: ReportDraft,
    pub classification: Option<Classification>,
    pub report_id: Option<Uuid>,
}

impl SubmissionView {
    fn of(workflow: &SubmissionWorkflow) -> Self {
        Self {
            state: workflow.state(),
            draft: workflow.draft().clone(),
            classification: workflow.classification().cloned(),
            report_id: workflow.submitted_id(),
        }
    }
}

/// POST /submission/photo query
#[derive(Debug, Deserialize)]
pub struct PhotoQuery {
    #[serde(default)]
    pub filename: Option<String>,
}

/// POST /submission/location request: a device fix or the device's error
#[derive(Debug, Deserialize)]
pub struct LocationRequest {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub error: Option<String>,
}

/// POST /submission/location response
#[derive(Debug, Serialize)]
pub struct LocationResponse {
    pub located: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub submission: SubmissionView,
}

/// PUT /submission/species request
#[derive(Debug, Deserialize)]
pub struct SpeciesRequest {
    pub species: String,
}

/// GET /submission
pub async fn get_submission(State(state): State<AppState>) -> Json<SubmissionView> {
    let workflow = state.workflow.lock().await;
    Json(SubmissionView::of(&workflow))
}

/// POST /submission/photo
///
/// Raw image body. Succeeds whenever the upload succeeds, even if species recognition failed.
pub async fn upload_photo(
    State(state): State<AppState>,
    Query(query): Query<PhotoQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResult<Json<SubmissionView>> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let photo = PhotoUpload {
        bytes: body.to_vec(),
        file_name: query.filename.unwrap_or_default(),
        content_type,
    };

    let mut workflow = state.workflow.lock().await;
    workflow.capture(photo).await?;

    Ok(Json(SubmissionView::of(&workflow)))
}

/// POST /submission/location
pub async fn report_location(
    State(state): State<AppState>,
    Json(request): Json<LocationRequest>,
) -> ApiResult<Json<LocationResponse>> {
    let provider = ReportedPosition::from_parts(request.latitude, request.longitude, request.error);

    let mut workflow = state.workflow.lock().await;
    let outcome = workflow.locate(&provider).await?;

    let (located, reason) = match outcome {
        LocateOutcome::Located(_) => (true, None),
        LocateOutcome::Unavailable(reason) => (false, Some(reason)),
    };

    Ok(Json(LocationResponse {
        located,
        reason,
        submission: SubmissionView::of(&workflow),
    }))
}

/// POST /submission/location/skip
pub async fn skip_location(State(state): State<AppState>) -> ApiResult<Json<SubmissionView>> {
    let mut workflow = state.workflow.lock().await;
    workflow.skip_location()?;
    Ok(Json(SubmissionView::of(&workflow)))
}

/// PUT /submission/species
pub async fn edit_species(
    State(state): State<AppState>,
    Json(request): Json<SpeciesRequest>,
) -> ApiResult<Json<SubmissionView>> {
    let mut workflow = state.workflow.lock().await;
    workflow.edit_species(request.species)?;
    Ok(Json(SubmissionView::of(&workflow)))
}

/// POST /submission/submit
pub async fn submit(
    State(state): State<AppState>,
    Json(details): Json<SubmissionDetails>,
) -> ApiResult<(StatusCode, Json<Report>)> {
    let mut workflow = state.workflow.lock().await;
    let report = workflow.submit(details).await?;
    Ok((StatusCode::CREATED, Json(report)))
}

/// POST /submission/reset
pub async fn reset(State(state): State<AppState>) -> Json<SubmissionView> {
    let mut workflow = state.workflow.lock().await;
    workflow.reset();
    Json(SubmissionView::of(&workflow))
}

/// Build submission workflow routes
pub fn submission_routes() -> Router<AppState> {
    Router::new()
        .route("/submission", get(get_submission))
        .route(
            "/submission/photo",
            post(upload_photo).layer(DefaultBodyLimit::max(MAX_PHOTO_BYTES)),
        )
        .route("/submission/location", post(report_location))
        .route("/submission/location/skip", post(skip_location))
        .route("/submission/species", put(edit_species))
        .route("/submission/submit", post(submit))
        .route("/submission/reset", post(reset))
}
