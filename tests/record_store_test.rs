//! Record store upserts against a mock HTTP backend.

use chrono::{TimeZone, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use gitgenie::error::RecordError;
use gitgenie::record::{CommitRecord, HttpRecordStore, RecordStore};

fn record() -> CommitRecord {
    CommitRecord {
        author_name: "Ada Lovelace".to_string(),
        author_email: "ada@example.com".to_string(),
        repository: "acme/widgets".to_string(),
        commit_id: "3f2a9c0d".to_string(),
        subject: "Add parser".to_string(),
        body: "src/parser.rs: new module".to_string(),
        impact: Some(62.5),
        created_at: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap(),
    }
}

#[tokio::test]
async fn test_upsert_puts_record_at_key() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/commits/acme%2Fwidgets/3f2a9c0d"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "author_name": "Ada Lovelace",
            "author_email": "ada@example.com",
            "repository": "acme/widgets",
            "commit_id": "3f2a9c0d",
            "subject": "Add parser",
            "body": "src/parser.rs: new module",
            "impact": 62.5,
            "created_at": "2026-05-01T12:00:00Z"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(2)
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri()).unwrap();
    store.upsert(&record()).await.unwrap();
    // Upserting the same key again is fine.
    store.upsert(&record()).await.unwrap();
}

#[tokio::test]
async fn test_rejected_write_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let store = HttpRecordStore::new(&server.uri()).unwrap();
    match store.upsert(&record()).await {
        Err(RecordError::Rejected { status, body }) => {
            assert_eq!(status, 503);
            assert_eq!(body, "maintenance");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_store() {
    let store = HttpRecordStore::new("http://127.0.0.1:9").unwrap();
    assert!(matches!(
        store.upsert(&record()).await,
        Err(RecordError::Unreachable(_))
    ));
}
