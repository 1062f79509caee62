//! HTTP routing tests driving the workflow end to end through the router

mod helpers;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use helpers::{CountingStore, FakeClassifier, FakeObjectStore};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use wsw_common::db::connect_in_memory;
use wsw_common::events::EventBus;
use wsw_intake::services::classifier::RECOGNITION_FAILED;
use wsw_intake::{build_router, AppState};

struct TestApp {
    router: Router,
    _photos: tempfile::TempDir,
}

async fn test_app(object_store: FakeObjectStore, classifier: FakeClassifier) -> TestApp {
    let photos = tempfile::tempdir().unwrap();
    let state = AppState::with_report_store(
        connect_in_memory().await.unwrap(),
        EventBus::new(32),
        Arc::new(object_store),
        Arc::new(classifier),
        Arc::new(CountingStore::new().await),
        photos.path().to_path_buf(),
    );
    state.load_snapshot().await.unwrap();

    TestApp {
        router: build_router(state),
        _photos: photos,
    }
}

async fn send(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn post_photo() -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/submission/photo?filename=strike.jpg")
        .header(header::CONTENT_TYPE, "image/jpeg")
        .body(Body::from(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10]))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;

    let (status, body) = send(&app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["module"], "wsw-intake");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_statistics_null_when_empty() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;

    let (status, body) = send(&app, get("/reports/statistics")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.is_null());
}

#[tokio::test]
async fn test_full_submission_flow() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Answer("五色鳥 (95%)")).await;

    let (status, body) = send(&app, get("/submission")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AWAITING_PHOTO");

    let (status, body) = send(&app, post_photo()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AWAITING_CONFIRMATION");
    assert_eq!(body["draft"]["bird_species"], "五色鳥 (95%)");
    assert_eq!(body["classification"]["kind"], "identified");

    let (status, body) = send(
        &app,
        post_json("/submission/location", json!({"latitude": 25.03, "longitude": 121.56})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["located"], true);
    assert_eq!(body["submission"]["state"], "AWAITING_DETAILS");

    let (status, report) = send(
        &app,
        post_json(
            "/submission/submit",
            json!({"status": "injured", "window_type": "mirrored", "reporter_name": "Yeh"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(report["status"], "injured");
    assert_eq!(report["window_type"], "mirrored");
    assert!(report["id"].as_str().is_some());

    let (_, reports) = send(&app, get("/reports")).await;
    assert_eq!(reports.as_array().unwrap().len(), 1);
    assert_eq!(reports[0]["id"], report["id"]);

    let (_, stats) = send(&app, get("/reports/statistics")).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["top_species"][0]["species"], "五色鳥");

    let (_, points) = send(&app, get("/reports/map")).await;
    assert_eq!(points[0]["coordinates"]["latitude"], 25.03);

    let (_, body) = send(&app, post_json("/submission/reset", json!({}))).await;
    assert_eq!(body["state"], "AWAITING_PHOTO");
    assert_eq!(body["draft"]["bird_species"], "");
    assert!(body["report_id"].is_null());
}

#[tokio::test]
async fn test_photo_accepted_when_classifier_down() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;

    let (status, body) = send(&app, post_photo()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AWAITING_CONFIRMATION");
    assert_eq!(body["draft"]["bird_species"], RECOGNITION_FAILED);
}

#[tokio::test]
async fn test_upload_failure_is_bad_gateway() {
    let app = test_app(FakeObjectStore::failing(), FakeClassifier::Fail).await;

    let (status, body) = send(&app, post_photo()).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");

    let (_, body) = send(&app, get("/submission")).await;
    assert_eq!(body["state"], "AWAITING_PHOTO");
}

#[tokio::test]
async fn test_denied_location_keeps_state() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;
    send(&app, post_photo()).await;

    let (status, body) = send(
        &app,
        post_json("/submission/location", json!({"error": "User denied Geolocation"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["located"], false);
    assert_eq!(body["submission"]["state"], "AWAITING_CONFIRMATION");

    let (status, body) = send(&app, post_json("/submission/location/skip", json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["state"], "AWAITING_DETAILS");
    assert!(body["draft"]["location"].is_null());
}

#[tokio::test]
async fn test_species_edit() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;
    send(&app, post_photo()).await;

    let request = Request::builder()
        .method("PUT")
        .uri("/submission/species")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({"species": "Black Bulbul"}).to_string()))
        .unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["draft"]["bird_species"], "Black Bulbul");
}

#[tokio::test]
async fn test_out_of_order_step_is_conflict() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;

    let (status, body) = send(&app, post_json("/submission/submit", json!({}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_empty_photo_body_is_bad_request() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;
    let request = Request::builder()
        .method("POST")
        .uri("/submission/photo")
        .body(Body::empty())
        .unwrap();

    let (status, _) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_empty_photo_after_capture_is_conflict() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;
    send(&app, post_photo()).await;
    let request = Request::builder()
        .method("POST")
        .uri("/submission/photo")
        .body(Body::empty())
        .unwrap();

    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_unrecognized_status_or_window_type_is_rejected() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Fail).await;
    send(&app, post_photo()).await;
    send(&app, post_json("/submission/location/skip", json!({}))).await;

    let (status, body) =
        send(&app, post_json("/submission/submit", json!({"status": "flying"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let (status, _) = send(
        &app,
        post_json("/submission/submit", json!({"window_type": "brick"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, reports) = send(&app, get("/reports")).await;
    assert!(reports.as_array().unwrap().is_empty());
    let (_, body) = send(&app, get("/submission")).await;
    assert_eq!(body["state"], "AWAITING_DETAILS");

    let (status, _) =
        send(&app, post_json("/submission/submit", json!({"status": "stunned"}))).await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_single_report_lookup() {
    let app = test_app(FakeObjectStore::default(), FakeClassifier::Answer("麻雀 (80%)")).await;
    send(&app, post_photo()).await;
    send(&app, post_json("/submission/location/skip", json!({}))).await;
    let (_, report) = send(&app, post_json("/submission/submit", json!({}))).await;
    let id = report["id"].as_str().unwrap();

    let (status, body) = send(&app, get(&format!("/reports/{}", id))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["bird_species"], "麻雀 (80%)");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app, get(&format!("/reports/{}", missing))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}
