//! Integration tests for the admin API
//!
//! Each test builds its own router over a fresh MemoryStore.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use hoc_census::census::{CensusField, CensusPipeline};
use hoc_census::store::MemoryStore;
use hoc_census::{build_router, AppState};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::util::ServiceExt; // for `oneshot` method

fn setup_app() -> axum::Router {
    let pipeline = CensusPipeline::new(Arc::new(MemoryStore::new()));
    build_router(AppState::new(pipeline))
}

fn csv_request(body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/census")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body))
        .unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn census_csv(rows: &[&str]) -> String {
    let header = [
        CensusField::FullName,
        CensusField::Course,
        CensusField::IntakeBatch,
        CensusField::Writeup,
    ]
    .iter()
    .map(|f| format!("\"{}\"", f.label()))
    .collect::<Vec<_>>()
    .join(",");

    let mut text = header;
    for row in rows {
        text.push('\n');
        text.push_str(row);
    }
    text.push('\n');
    text
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let response = setup_app().oneshot(get_request("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hoc-census");
    assert!(body["version"].is_string());
}

// =============================================================================
// Census upload
// =============================================================================

#[tokio::test]
async fn test_census_upload_returns_directory() {
    let csv = census_csv(&[
        "Jane Tan,Computer Engineering,AY21/22,Hi!",
        ",,,",
        "Ravi Kumar,Master of Computing,AY23/24,",
    ]);

    let response = setup_app().oneshot(csv_request(csv)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["skipped"], 1);
    assert_eq!(body["inserted"], 2);
    assert_eq!(body["total_records"], 2);
    assert_eq!(
        body["message"],
        "2 profiles processed from CSV. Total 2 profiles in cleaned census."
    );
    assert_eq!(body["json_data"]["ay21-22"]["CEG"]["jane-tan"]["writeup"], "Hi!");
    assert_eq!(
        body["json_data"]["ay23-24"]["MS"]["ravi-kumar"]["academic_career"],
        "E-Scholars Graduate"
    );
    assert!(body["json_data"]["ay21-22"]["CEG"]["jane-tan"].get("email").is_none());
}

#[tokio::test]
async fn test_census_upload_rejects_ragged_csv() {
    let csv = census_csv(&["Jane Tan,Computer Engineering"]);

    let response = setup_app().oneshot(csv_request(csv)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "PARSE_ERROR");
}

#[tokio::test]
async fn test_census_upload_rejects_header_only_file() {
    let response = setup_app()
        .oneshot(csv_request(census_csv(&[])))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_census_upload_rejects_empty_body() {
    let response = setup_app()
        .oneshot(csv_request(String::new()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Single profile
// =============================================================================

#[tokio::test]
async fn test_add_profile_then_update() {
    let app = setup_app();
    let submission = |writeup: &str| {
        json!({
            "Full name (as per NRIC)": "Jane Tan",
            "What course are you from?": "Computer Engineering",
            "Which intake batch are you from?": "AY21/22",
            "Self write-up (e.g. Yuxuan's self write-up below). It'll be publicly available so you can also use it as a personal showcase page! (Limit: 200 words)": writeup,
        })
    };

    let first = app
        .clone()
        .oneshot(json_request("/api/profile", submission("Draft")))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    let body = extract_json(first.into_body()).await;
    assert_eq!(body["inserted"], 1);
    assert_eq!(
        body["message"],
        "Profile for Jane Tan processed. Total 1 profiles in cleaned census."
    );

    let second = app
        .clone()
        .oneshot(json_request("/api/profile", submission("Final")))
        .await
        .unwrap();
    let body = extract_json(second.into_body()).await;
    assert_eq!(body["updated"], 1);
    assert_eq!(body["total_records"], 1);
    assert_eq!(body["json_data"]["ay21-22"]["CEG"]["jane-tan"]["writeup"], "Final");

    let directory = app.oneshot(get_request("/api/directory")).await.unwrap();
    assert_eq!(directory.status(), StatusCode::OK);
    let body = extract_json(directory.into_body()).await;
    assert_eq!(body["ay21-22"]["CEG"]["jane-tan"]["writeup"], "Final");
}

#[tokio::test]
async fn test_add_profile_rejects_blank_submission() {
    let response = setup_app()
        .oneshot(json_request(
            "/api/profile",
            json!({ "Full name (as per NRIC)": "   " }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_directory_starts_empty() {
    let response = setup_app()
        .oneshot(get_request("/api/directory"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extract_json(response.into_body()).await, json!({}));
}
