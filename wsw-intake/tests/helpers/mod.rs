//! Collaborator fakes shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use wsw_common::db::{connect_in_memory, ReportStore, SqliteReportStore};
use wsw_common::events::EventBus;
use wsw_common::{Coordinates, Report, ReportDraft};
use wsw_intake::models::PhotoUpload;
use wsw_intake::services::{
    LocationProvider, ObjectStore, ReportSnapshot, ServiceError, SpeciesClassifier,
    SubmissionWorkflow,
};

/// Object store that records uploads in memory or always fails
#[derive(Default)]
pub struct FakeObjectStore {
    pub fail: bool,
    pub uploads: AtomicUsize,
}

impl FakeObjectStore {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }
}

#[async_trait]
impl ObjectStore for FakeObjectStore {
    async fn upload(&self, name: &str, _bytes: &[u8], _ct: &str) -> Result<String, ServiceError> {
        if self.fail {
            return Err(ServiceError::Upload("bucket unavailable".to_string()));
        }
        self.uploads.fetch_add(1, Ordering::SeqCst);
        Ok(format!("https://photos.test/{}", name))
    }
}

/// Classifier with a scripted behaviour
pub enum FakeClassifier {
    Answer(&'static str),
    Fail,
    /// Sleeps, then reports a timeout like an HTTP client would
    TimeOut(Duration),
}

#[async_trait]
impl SpeciesClassifier for FakeClassifier {
    async fn classify(&self, _: &[u8], _: &str, _: &str) -> Result<String, ServiceError> {
        match self {
            FakeClassifier::Answer(text) => Ok(text.to_string()),
            FakeClassifier::Fail => Err(ServiceError::Classification(
                "503 Service Unavailable".to_string(),
            )),
            FakeClassifier::TimeOut(delay) => {
                tokio::time::sleep(*delay).await;
                Err(ServiceError::Classification("operation timed out".to_string()))
            }
        }
    }
}

/// Record store wrapper counting inserts, optionally failing them
pub struct CountingStore {
    pub inner: SqliteReportStore,
    pub inserts: AtomicUsize,
    pub fail_inserts: AtomicUsize,
}

impl CountingStore {
    pub async fn new() -> Self {
        Self {
            inner: SqliteReportStore::new(connect_in_memory().await.unwrap()),
            inserts: AtomicUsize::new(0),
            fail_inserts: AtomicUsize::new(0),
        }
    }

    /// Make the next `n` inserts fail
    pub fn fail_next(&self, n: usize) {
        self.fail_inserts.store(n, Ordering::SeqCst);
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportStore for CountingStore {
    async fn insert(&self, draft: ReportDraft) -> wsw_common::Result<Report> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_inserts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_inserts.store(remaining - 1, Ordering::SeqCst);
            return Err(wsw_common::Error::Internal("disk full".to_string()));
        }
        self.inner.insert(draft).await
    }

    async fn list_all(&self) -> wsw_common::Result<Vec<Report>> {
        self.inner.list_all().await
    }
}

/// Location provider with a fixed answer
pub struct FixedLocation(pub Option<Coordinates>);

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_position(&self) -> Result<Coordinates, ServiceError> {
        self.0
            .ok_or_else(|| ServiceError::Location("permission denied".to_string()))
    }
}

pub struct Harness {
    pub workflow: SubmissionWorkflow,
    pub object_store: Arc<FakeObjectStore>,
    pub store: Arc<CountingStore>,
    pub snapshot: ReportSnapshot,
    pub event_bus: EventBus,
}

pub async fn harness(object_store: FakeObjectStore, classifier: FakeClassifier) -> Harness {
    let object_store = Arc::new(object_store);
    let store = Arc::new(CountingStore::new().await);
    let snapshot = ReportSnapshot::new();
    let event_bus = EventBus::new(32);

    let workflow = SubmissionWorkflow::new(
        object_store.clone(),
        Arc::new(classifier),
        store.clone(),
        snapshot.clone(),
        event_bus.clone(),
    );

    Harness {
        workflow,
        object_store,
        store,
        snapshot,
        event_bus,
    }
}

pub fn jpeg_photo() -> PhotoUpload {
    PhotoUpload {
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F', b'I', b'F', 0x00],
        file_name: "IMG_2031.jpg".to_string(),
        content_type: Some("image/jpeg".to_string()),
    }
}
