//! wsw-intake library interface
//!
//! Window-strike report intake: the submission workflow, its collaborators and the HTTP
//! surface that drives it.

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::{services::ServeDir, trace::TraceLayer};
use wsw_common::db::{ReportStore, SqliteReportStore};
use wsw_common::events::EventBus;

use crate::services::{ObjectStore, ReportSnapshot, SpeciesClassifier, SubmissionWorkflow};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
    /// The single in-flight submission; the lock serializes workflow steps
    pub workflow: Arc<Mutex<SubmissionWorkflow>>,
    /// Persisted reports as of the last refresh
    pub snapshot: ReportSnapshot,
    /// Record store behind the workflow
    pub report_store: Arc<dyn ReportStore>,
    /// Directory served under /photos
    pub photo_dir: PathBuf,
    /// Service startup timestamp for uptime tracking
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        event_bus: EventBus,
        object_store: Arc<dyn ObjectStore>,
        classifier: Arc<dyn SpeciesClassifier>,
        photo_dir: PathBuf,
    ) -> Self {
        let report_store: Arc<dyn ReportStore> = Arc::new(SqliteReportStore::new(db.clone()));
        Self::with_report_store(db, event_bus, object_store, classifier, report_store, photo_dir)
    }

    /// Same as [`AppState::new`] with an explicit record store
    pub fn with_report_store(
        db: SqlitePool,
        event_bus: EventBus,
        object_store: Arc<dyn ObjectStore>,
        classifier: Arc<dyn SpeciesClassifier>,
        report_store: Arc<dyn ReportStore>,
        photo_dir: PathBuf,
    ) -> Self {
        let snapshot = ReportSnapshot::new();
        let workflow = SubmissionWorkflow::new(
            object_store,
            classifier,
            report_store.clone(),
            snapshot.clone(),
            event_bus.clone(),
        );

        Self {
            db,
            event_bus,
            workflow: Arc::new(Mutex::new(workflow)),
            snapshot,
            report_store,
            photo_dir,
            startup_time: Utc::now(),
        }
    }

    /// Fill the report snapshot from the record store
    pub async fn load_snapshot(&self) -> wsw_common::Result<usize> {
        self.snapshot.refresh(self.report_store.as_ref()).await
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let photos = ServeDir::new(&state.photo_dir);

    Router::new()
        .merge(api::submission_routes())
        .merge(api::report_routes())
        .merge(api::health_routes())
        .route("/events", get(api::event_stream))
        .nest_service("/photos", photos)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
