//! Persistence of commit records in an external store.
//!
//! Records are keyed by `(repository, commit_id)` and written with an
//! idempotent `PUT {base}/commits/{repository}/{commit_id}`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RecordError;

const STORE_TIMEOUT_SECS: u64 = 30;

/// A persisted description of one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitRecord {
    pub author_name: String,
    pub author_email: String,
    pub repository: String,
    pub commit_id: String,
    pub subject: String,
    pub body: String,
    pub impact: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// A store that upserts commit records.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace the record for `(repository, commit_id)`.
    async fn upsert(&self, record: &CommitRecord) -> Result<(), RecordError>;
}

/// Record store reached over HTTP.
#[derive(Debug)]
pub struct HttpRecordStore {
    http: reqwest::Client,
    base: Url,
}

impl HttpRecordStore {
    /// Connect to the store at `connection`, an `http://` or `https://` base URL.
    pub fn new(connection: &str) -> Result<Self, RecordError> {
        let base = Url::parse(connection.trim())
            .map_err(|_| RecordError::InvalidConnection(connection.to_string()))?;

        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            return Err(RecordError::InvalidConnection(connection.to_string()));
        }

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(STORE_TIMEOUT_SECS))
            .build()
            .map_err(RecordError::Unreachable)?;

        Ok(Self { http, base })
    }

    /// URL of the record for `(repository, commit_id)`.
    ///
    /// Each key is a single path segment, so `owner/repo` is percent-encoded.
    pub fn record_url(&self, repository: &str, commit_id: &str) -> Result<Url, RecordError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RecordError::InvalidConnection(self.base.to_string()))?
            .pop_if_empty()
            .extend(["commits", repository, commit_id]);
        Ok(url)
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn upsert(&self, record: &CommitRecord) -> Result<(), RecordError> {
        let url = self.record_url(&record.repository, &record.commit_id)?;
        debug!("Upserting commit record at {url}");

        let response = self
            .http
            .put(url)
            .json(record)
            .send()
            .await
            .map_err(RecordError::Unreachable)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(RecordError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_non_http_connections() {
        for conn in ["mongodb://localhost:27017", "not a url", "ftp://host/x"] {
            assert!(matches!(
                HttpRecordStore::new(conn),
                Err(RecordError::InvalidConnection(_))
            ));
        }
    }

    #[test]
    fn test_record_url_encodes_keys() {
        let store = HttpRecordStore::new("https://records.example.com/api/").unwrap();
        let url = store.record_url("acme/widgets", "abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://records.example.com/api/commits/acme%2Fwidgets/abc123"
        );
    }

    #[test]
    fn test_record_url_without_trailing_slash() {
        let store = HttpRecordStore::new("http://localhost:8080").unwrap();
        let url = store.record_url("widgets", "deadbeef").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/commits/widgets/deadbeef");
    }

    #[test]
    fn test_record_serializes_all_fields() {
        let record = CommitRecord {
            author_name: "Ada".to_string(),
            author_email: "ada@example.com".to_string(),
            repository: "acme/widgets".to_string(),
            commit_id: "abc123".to_string(),
            subject: "Add parser".to_string(),
            body: String::new(),
            impact: Some(42.5),
            created_at: DateTime::parse_from_rfc3339("2026-01-02T03:04:05Z")
                .unwrap()
                .with_timezone(&Utc),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["commit_id"], "abc123");
        assert_eq!(json["impact"], 42.5);
        assert_eq!(json["created_at"], "2026-01-02T03:04:05Z");
    }
}
